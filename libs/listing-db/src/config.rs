use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use listing_core::{Error, Result, SortType};
use serde::{Deserialize, Serialize};

/// Process-wide defaults every endpoint configuration starts from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingDefaults {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub default_srt_ord: SortType,
    /// When false, endpoints switch to their count-less paginator.
    pub allow_count_query_by_paginator: bool,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 50,
            default_srt_ord: SortType::Dsc,
            allow_count_query_by_paginator: true,
        }
    }
}

impl ListingDefaults {
    /// Extracts the `listing` section of an already assembled figment,
    /// falling back to defaults for anything not set.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(figment.focus("listing"));
        figment
            .extract()
            .map_err(|e| Error::config(format!("failed to extract listing defaults: {e}")))
    }

    /// Layered loading: defaults → YAML file (`listing:` section) → environment.
    ///
    /// Example: `LISTING__MAX_PAGE_SIZE=100` maps to `listing.max_page_size`.
    pub fn load_layered(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed("LISTING__").split("__").map(|key| {
            format!("listing.{}", key.as_str()).into()
        }));
        Self::from_figment(&figment)
    }
}
