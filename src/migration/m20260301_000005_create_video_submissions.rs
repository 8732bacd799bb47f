//! Migration: Create video_submissions table.

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
                CREATE TABLE video_submissions (
                    id UUID PRIMARY KEY,
                    challenge_id UUID NOT NULL REFERENCES challenges(id) ON DELETE CASCADE,
                    video_id UUID NOT NULL REFERENCES videos(id) ON DELETE CASCADE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT uq_video_submissions_video_challenge UNIQUE (video_id, challenge_id)
                );

                CREATE INDEX idx_video_submissions_challenge ON video_submissions(challenge_id);

                CREATE TRIGGER update_video_submissions_updated_at
                    BEFORE UPDATE ON video_submissions
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
                DROP TRIGGER IF EXISTS update_video_submissions_updated_at ON video_submissions;
                DROP TABLE IF EXISTS video_submissions CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
