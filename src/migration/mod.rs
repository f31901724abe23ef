//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20240220_000001_create_test_results;

pub use m20240220_000001_create_test_results::OPERATOR_INDEX;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240220_000001_create_test_results::Migration)]
    }
}
