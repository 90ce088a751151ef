use std::sync::Arc;

use listing_core::{Error, ExtraContext, Result, SortType};
use sea_orm::sea_query::Order;
use sea_orm::{EntityTrait, QueryTrait, Select};

use crate::fields::ModelFields;
use crate::mapper::ResolvedSort;

/// Orders a query by a single internal field.
pub trait SortStrategy<E: EntityTrait>: Send + Sync {
    fn sort(&self, query: Select<E>, spec: &ResolvedSort, extra: &ExtraContext)
        -> Result<Select<E>>;
}

/// Validates the direction and the field against the model, then orders.
pub struct DefaultSorter<E: EntityTrait> {
    model: Arc<ModelFields<E>>,
}

impl<E: EntityTrait> DefaultSorter<E> {
    pub fn new(model: Arc<ModelFields<E>>) -> Self {
        Self { model }
    }
}

impl<E: EntityTrait> SortStrategy<E> for DefaultSorter<E> {
    fn sort(
        &self,
        mut query: Select<E>,
        spec: &ResolvedSort,
        _extra: &ExtraContext,
    ) -> Result<Select<E>> {
        let order = match SortType::parse(&spec.sort_type) {
            Some(SortType::Asc) => Order::Asc,
            Some(SortType::Dsc) => Order::Desc,
            None => return Err(Error::InvalidSortType(spec.sort_type.clone())),
        };
        let column = spec.column(&self.model)?;
        QueryTrait::query(&mut query).order_by(column, order);
        Ok(query)
    }
}
