#![allow(dead_code)]
use anyhow::Result;
use listing_core::RequestParams;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

pub mod employee {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "employees")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub emp_no: i32,
        pub first_name: String,
        pub last_name: String,
        pub gender: String,
        pub hire_date: String,
        pub city: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub const TOTAL: u64 = 12;
pub const MALE: u64 = 6;

const SCHEMA: &str = "CREATE TABLE employees (
    emp_no INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    gender TEXT NOT NULL,
    hire_date TEXT NOT NULL,
    city TEXT
)";

const SEED: &str = "INSERT INTO employees (emp_no, first_name, last_name, gender, hire_date, city) VALUES
    (10001, 'Georgi', 'Facello', 'M', '1986-06-26', 'Sofia'),
    (10002, 'Bezalel', 'Simmel', 'F', '1985-11-21', 'Oslo'),
    (10003, 'Parto', 'Bamford', 'M', '1986-08-28', 'Oslo'),
    (10004, 'Chirstian', 'Koblick', 'M', '1986-12-01', NULL),
    (10005, 'Kyoichi', 'Maliniak', 'M', '1989-09-12', 'Tokyo'),
    (10006, 'Anneke', 'Preusig', 'F', '1989-06-02', 'Oslo'),
    (10007, 'Tzvetan', 'Zielinski', 'F', '1989-02-10', NULL),
    (10008, 'Saniya', 'Kalloufi', 'M', '1994-09-15', 'Sofia'),
    (10009, 'Sumant', 'Peac', 'F', '1985-02-18', 'Tokyo'),
    (10010, 'Duangkaew', 'Piveteau', 'F', '1989-08-24', 'Oslo'),
    (10011, 'Mary', 'Sluis', 'F', '1990-01-22', NULL),
    (10012, 'Patricio', 'Bridgland', 'M', '1992-12-18', 'Sofia')";

/// Seeded in-memory sqlite; a single pooled connection keeps the data alive.
pub async fn bring_up_sqlite() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await?;
    conn.execute_unprepared(SCHEMA).await?;
    conn.execute_unprepared(SEED).await?;
    Ok(conn)
}

pub fn params(pairs: &[(&str, &str)]) -> RequestParams {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

/// `emp_no` of every row, in page order.
pub fn ids(page: &listing_core::Page<serde_json::Value>) -> Vec<i64> {
    page.data
        .iter()
        .filter_map(|row| row.get("emp_no").and_then(serde_json::Value::as_i64))
        .collect()
}
