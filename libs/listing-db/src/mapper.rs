//! Client alias → internal field mapping, one mapper for filters and one for
//! sorts per endpoint. Built at endpoint-definition time and read-only after.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use listing_core::{Error, FieldSet, FilterSpec, FilterValue, Result, SortSpec};
use sea_orm::sea_query::ColumnRef;
use sea_orm::EntityTrait;

use crate::fields::{FieldExtractor, ModelFields};
use crate::filters::FilterUnit;

pub struct FieldSpec<E: EntityTrait> {
    pub internal_field: String,
    pub filter: Option<Arc<dyn FilterUnit<E>>>,
    pub extractor: Option<FieldExtractor>,
}

impl<E: EntityTrait> Clone for FieldSpec<E> {
    fn clone(&self) -> Self {
        Self {
            internal_field: self.internal_field.clone(),
            filter: self.filter.clone(),
            extractor: self.extractor,
        }
    }
}

impl<E: EntityTrait> fmt::Debug for FieldSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("internal_field", &self.internal_field)
            .field("filter", &self.filter.as_ref().map(|u| u.name()))
            .field("custom_extractor", &self.extractor.is_some())
            .finish()
    }
}

impl<E: EntityTrait> FieldSpec<E> {
    pub fn sort(internal_field: impl Into<String>) -> Self {
        Self {
            internal_field: internal_field.into(),
            filter: None,
            extractor: None,
        }
    }

    pub fn filter(internal_field: impl Into<String>, unit: impl FilterUnit<E> + 'static) -> Self {
        Self {
            internal_field: internal_field.into(),
            filter: Some(Arc::new(unit)),
            extractor: None,
        }
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    fn owner(&self) -> String {
        match &self.filter {
            Some(unit) => format!("filter '{}' on '{}'", unit.name(), self.internal_field),
            None => format!("sort on '{}'", self.internal_field),
        }
    }
}

/// A filter after alias rewriting; only internal field paths from here on.
pub struct ResolvedFilter<E: EntityTrait> {
    pub field: String,
    pub value: Option<FilterValue>,
    pub unit: Arc<dyn FilterUnit<E>>,
    pub extractor: Option<FieldExtractor>,
}

impl<E: EntityTrait> ResolvedFilter<E> {
    pub fn column(&self, model: &ModelFields<E>) -> Result<ColumnRef> {
        model.resolve(&self.field, self.extractor)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedSort {
    pub field: String,
    pub sort_type: String,
    pub extractor: Option<FieldExtractor>,
}

impl ResolvedSort {
    pub fn column<E: EntityTrait>(&self, model: &ModelFields<E>) -> Result<ColumnRef> {
        model.resolve(&self.field, self.extractor)
    }
}

pub struct FieldMapper<E: EntityTrait> {
    entries: BTreeMap<String, FieldSpec<E>>,
}

impl<E: EntityTrait> Default for FieldMapper<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> Clone for FieldMapper<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for FieldMapper<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<E: EntityTrait> FieldMapper<E> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Rejects empty aliases and aliases that are already bound.
    pub fn register(&mut self, alias: impl Into<String>, spec: FieldSpec<E>) -> Result<()> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(Error::config(format!(
                "field alias must be a non-empty string (for {})",
                spec.owner()
            )));
        }
        if let Some(previous) = self.entries.get(&alias) {
            return Err(Error::DuplicateAlias {
                alias,
                owner: previous.owner(),
            });
        }
        self.entries.insert(alias, spec);
        Ok(())
    }

    pub fn filter(
        mut self,
        alias: impl Into<String>,
        internal_field: impl Into<String>,
        unit: impl FilterUnit<E> + 'static,
    ) -> Result<Self> {
        self.register(alias, FieldSpec::filter(internal_field, unit))?;
        Ok(self)
    }

    pub fn filter_with_extractor(
        mut self,
        alias: impl Into<String>,
        internal_field: impl Into<String>,
        unit: impl FilterUnit<E> + 'static,
        extractor: FieldExtractor,
    ) -> Result<Self> {
        self.register(
            alias,
            FieldSpec::filter(internal_field, unit).with_extractor(extractor),
        )?;
        Ok(self)
    }

    pub fn sort(mut self, alias: impl Into<String>, internal_field: impl Into<String>) -> Result<Self> {
        self.register(alias, FieldSpec::sort(internal_field))?;
        Ok(self)
    }

    pub fn sort_with_extractor(
        mut self,
        alias: impl Into<String>,
        internal_field: impl Into<String>,
        extractor: FieldExtractor,
    ) -> Result<Self> {
        self.register(alias, FieldSpec::sort(internal_field).with_extractor(extractor))?;
        Ok(self)
    }

    pub fn lookup(&self, alias: &str) -> Option<&FieldSpec<E>> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldSpec<E>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aliases among `fields` that this mapper does not know.
    pub fn unregistered<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> FieldSet {
        fields
            .into_iter()
            .filter(|f| !self.contains(f))
            .collect()
    }

    /// Custom extractor bound to an internal field, for specs that bypass aliasing.
    pub fn extractor_for_internal(&self, internal_field: &str) -> Option<FieldExtractor> {
        self.entries
            .values()
            .find(|spec| spec.internal_field == internal_field)
            .and_then(|spec| spec.extractor)
    }

    /// Rewrites already-validated filter specs to internal fields.
    pub fn rewrite_filters(&self, specs: Vec<FilterSpec>) -> Result<Vec<ResolvedFilter<E>>> {
        specs
            .into_iter()
            .map(|spec| {
                let entry = self.lookup(&spec.field).ok_or_else(|| {
                    Error::FiltersNotRegistered([spec.field.as_str()].into_iter().collect())
                })?;
                let unit = entry.filter.clone().ok_or_else(|| {
                    Error::config(format!("filter alias '{}' has no filter unit", spec.field))
                })?;
                Ok(ResolvedFilter {
                    field: entry.internal_field.clone(),
                    value: spec.value,
                    unit,
                    extractor: entry.extractor,
                })
            })
            .collect()
    }

    /// Rewrites already-validated sort specs to internal fields.
    pub fn rewrite_sorts(&self, specs: Vec<SortSpec>) -> Result<Vec<ResolvedSort>> {
        specs
            .into_iter()
            .map(|spec| {
                let entry = self.lookup(&spec.field).ok_or_else(|| {
                    Error::SortersNotRegistered([spec.field.as_str()].into_iter().collect())
                })?;
                Ok(ResolvedSort {
                    field: entry.internal_field.clone(),
                    sort_type: spec.sort_type,
                    extractor: entry.extractor,
                })
            })
            .collect()
    }
}
