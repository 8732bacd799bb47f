//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_videos;
mod m20260301_000003_create_video_notes;
mod m20260301_000004_create_challenges;
mod m20260301_000005_create_video_submissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_videos::Migration),
            Box::new(m20260301_000003_create_video_notes::Migration),
            Box::new(m20260301_000004_create_challenges::Migration),
            Box::new(m20260301_000005_create_video_submissions::Migration),
        ]
    }
}
