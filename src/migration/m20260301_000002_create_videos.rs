//! Migration: Create videos table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE videos (
                    id UUID PRIMARY KEY,
                    title VARCHAR(255) NOT NULL,
                    description TEXT,
                    object_key VARCHAR(1024) NOT NULL,
                    file_size BIGINT NOT NULL CHECK (file_size > 0),
                    content_type VARCHAR(100) NOT NULL,
                    user_id UUID NOT NULL REFERENCES users(id),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Student listings are always scoped by uploader
                CREATE INDEX idx_videos_user_created ON videos(user_id, created_at DESC);

                CREATE TRIGGER update_videos_updated_at
                    BEFORE UPDATE ON videos
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_videos_updated_at ON videos;
                DROP TABLE IF EXISTS videos CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
