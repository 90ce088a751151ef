use sea_orm::entity::prelude::*;

/// Dates are stored as ISO-8601 text (`YYYY-MM-DD`), which keeps them
/// lexicographically ordered on every backend.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub emp_no: i32,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub hire_date: String,
    pub birth_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
