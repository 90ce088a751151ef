//! Entity shared by the crate's unit tests.

pub mod staff {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "staff")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub gender: String,
        pub city: Option<String>,
        pub hired_at: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use sea_orm::{DbBackend, EntityTrait, QueryTrait, Select};

pub fn sql<E: EntityTrait>(query: &Select<E>) -> String {
    query.build(DbBackend::Sqlite).to_string()
}

pub fn pg_sql<E: EntityTrait>(query: &Select<E>) -> String {
    query.build(DbBackend::Postgres).to_string()
}

/// In-memory sqlite holding the `staff` table with three rows.
pub async fn staff_db() -> sea_orm::DatabaseConnection {
    use sea_orm::{ConnectOptions, ConnectionTrait, Database};

    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await.unwrap();
    conn.execute_unprepared(
        "CREATE TABLE staff (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            gender TEXT NOT NULL,
            city TEXT,
            hired_at TEXT
        )",
    )
    .await
    .unwrap();
    conn.execute_unprepared(
        "INSERT INTO staff (id, name, gender, city, hired_at) VALUES
            (1, 'Ada', 'F', 'Oslo', '2020-01-15'),
            (2, 'Bob', 'M', NULL, '2021-06-01'),
            (3, 'Cy', 'M', 'Oslo', NULL)",
    )
    .await
    .unwrap();
    conn
}
