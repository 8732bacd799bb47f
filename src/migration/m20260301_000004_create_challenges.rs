//! Migration: Create challenges table.

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
                CREATE TABLE challenges (
                    id UUID PRIMARY KEY,
                    title VARCHAR(255) NOT NULL,
                    description TEXT,
                    -- end_date is not required to follow start_date
                    start_date TIMESTAMPTZ NOT NULL,
                    end_date TIMESTAMPTZ NOT NULL,
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    creator_id UUID NOT NULL REFERENCES users(id),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_challenges_created_at ON challenges(created_at DESC);
                CREATE INDEX idx_challenges_active_start
                    ON challenges(start_date)
                    WHERE is_active;

                CREATE TRIGGER update_challenges_updated_at
                    BEFORE UPDATE ON challenges
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
                DROP TRIGGER IF EXISTS update_challenges_updated_at ON challenges;
                DROP TABLE IF EXISTS challenges CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
