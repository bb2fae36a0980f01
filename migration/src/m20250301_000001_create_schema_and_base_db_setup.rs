use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS shopper_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO shopper_platform, public;")
            .await?;

        // Create the base DB user that will execute all platform queries
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE shopper TO shopper;
                    GRANT ALL ON SCHEMA shopper_platform TO shopper;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA shopper_platform GRANT ALL ON TABLES TO shopper;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA shopper_platform GRANT ALL ON SEQUENCES TO shopper;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA shopper_platform GRANT ALL ON FUNCTIONS TO shopper;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA shopper_platform REVOKE ALL ON FUNCTIONS FROM shopper;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA shopper_platform REVOKE ALL ON SEQUENCES FROM shopper;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA shopper_platform REVOKE ALL ON TABLES FROM shopper;
                    REVOKE ALL ON SCHEMA shopper_platform FROM shopper;
                    REVOKE ALL PRIVILEGES ON DATABASE shopper FROM shopper;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS shopper_platform CASCADE;")
            .await?;

        Ok(())
    }
}
