//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_state_and_city_tables;
mod m20250101_000002_create_profile_table;
mod m20250101_000003_create_memory_table;
mod m20250101_000004_create_posting_table;
mod m20250101_000005_create_interaction_tables;
mod m20250101_000006_create_report_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_state_and_city_tables::Migration),
            Box::new(m20250101_000002_create_profile_table::Migration),
            Box::new(m20250101_000003_create_memory_table::Migration),
            Box::new(m20250101_000004_create_posting_table::Migration),
            Box::new(m20250101_000005_create_interaction_tables::Migration),
            Box::new(m20250101_000006_create_report_table::Migration),
        ]
    }
}
