use std::sync::Arc;

use listing_core::Result;
use listing_db::{
    BetweenUnixMillis, Contains, Equality, FieldMapper, GreaterThan, HasFieldValue, InList,
    ListingConfig, ListingDefaults, RegisteredListing, StartsWith, Strategies,
};
use tracing::info;

use crate::infra::storage::entity::Entity;

/// Column the endpoints fall back to when the client sends no sort.
pub const DEFAULT_SORT_FIELD: &str = "emp_no";

fn filter_mapper() -> Result<FieldMapper<Entity>> {
    FieldMapper::new()
        .filter("gdr", "gender", Equality)?
        .filter("fnm", "first_name", StartsWith)?
        .filter("lnm", "last_name", Contains)?
        .filter("emp", "emp_no", InList)?
        .filter("emp_after", "emp_no", GreaterThan)?
        .filter("hd", "hire_date", BetweenUnixMillis)?
        .filter("bd", "birth_date", HasFieldValue)
}

fn sort_mapper() -> Result<FieldMapper<Entity>> {
    FieldMapper::new()
        .sort("id", "emp_no")?
        .sort("fnm", "first_name")?
        .sort("lnm", "last_name")?
        .sort("hd", "hire_date")
}

fn employees_config(defaults: &ListingDefaults) -> Result<ListingConfig<Entity>> {
    Ok(ListingConfig::from_defaults(defaults, DEFAULT_SORT_FIELD)
        .with_filter_mapper(filter_mapper()?)
        .with_sort_mapper(sort_mapper()?))
}

/// Registered listings backing the employee endpoints.
#[derive(Debug)]
pub struct EmployeeListings {
    /// `/employees`: counted pagination, `totalCount` in every page.
    pub counted: RegisteredListing<Entity>,
    /// `/employees/without-count`: skips the count query.
    pub countless: RegisteredListing<Entity>,
}

impl EmployeeListings {
    pub fn new(defaults: &ListingDefaults) -> Result<Self> {
        let strategies = Arc::new(Strategies::with_defaults());
        let counted = employees_config(defaults)?.register(strategies.clone())?;
        let countless = employees_config(defaults)?
            .with_count_query(false)
            .register(strategies)?;

        info!(
            default_page_size = defaults.default_page_size,
            max_page_size = defaults.max_page_size,
            "employee listings registered"
        );
        Ok(Self { counted, countless })
    }
}
