use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202602010001_create_users::Migration),
            Box::new(migrations::m202602010002_create_activities::Migration),
            Box::new(migrations::m202602010003_create_registrations::Migration),
            Box::new(migrations::m202602080001_create_tasks::Migration),
            Box::new(migrations::m202602150001_create_submissions::Migration),
        ]
    }
}
