//! Migration: Create video_notes table.
//!
//! Un-scored rows are annotations; the single scored row per video is its
//! feedback record, enforced by a partial unique index.

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
                CREATE TABLE video_notes (
                    id UUID PRIMARY KEY,
                    content TEXT NOT NULL,
                    timestamp_ms BIGINT CHECK (timestamp_ms >= 0),
                    supervisor_id UUID NOT NULL REFERENCES users(id),
                    video_id UUID NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                    score INTEGER CHECK (score >= 0 AND score <= 100),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_video_notes_video_created ON video_notes(video_id, created_at);
                CREATE INDEX idx_video_notes_supervisor ON video_notes(supervisor_id);

                -- One feedback record per video (upsert conflict target)
                CREATE UNIQUE INDEX idx_video_notes_feedback
                    ON video_notes(video_id)
                    WHERE score IS NOT NULL;

                CREATE TRIGGER update_video_notes_updated_at
                    BEFORE UPDATE ON video_notes
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
                DROP TRIGGER IF EXISTS update_video_notes_updated_at ON video_notes;
                DROP TABLE IF EXISTS video_notes CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
