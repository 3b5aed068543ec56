pub use sea_orm_migration::prelude::*;

mod m20241019_090000_create_event_table;
mod m20241019_090500_create_booking_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241019_090000_create_event_table::Migration),
            Box::new(m20241019_090500_create_booking_table::Migration),
        ]
    }
}
