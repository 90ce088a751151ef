use listing_db::GenericDao;
use sea_orm::{ConnectionTrait, DbErr, Schema};

use super::entity::Entity;

pub type EmployeeDao = GenericDao<Entity>;

/// Creates the `employees` table if it does not exist yet.
pub async fn create_schema<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(Entity);
    stmt.if_not_exists();
    conn.execute(backend.build(&stmt)).await?;
    Ok(())
}
