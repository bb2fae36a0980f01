use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create inspection_status enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE shopper_platform.inspection_status AS ENUM (
                    'transcribed',
                    'extracting',
                    'awaiting_human',
                    'complete'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TYPE shopper_platform.inspection_status OWNER TO shopper")
            .await?;

        let create_users_sql = r#"
            CREATE TABLE IF NOT EXISTS shopper_platform.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                chat_user_id BIGINT NOT NULL,
                username VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT users_chat_user_unique UNIQUE(chat_user_id)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_users_sql)
            .await?;

        let create_questionnaires_sql = r#"
            CREATE TABLE IF NOT EXISTS shopper_platform.questionnaires (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_questionnaires_sql)
            .await?;

        let create_questions_sql = r#"
            CREATE TABLE IF NOT EXISTS shopper_platform.questions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                questionnaire_id UUID NOT NULL
                    REFERENCES shopper_platform.questionnaires(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                prompt TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT questions_questionnaire_position_unique
                    UNIQUE(questionnaire_id, position)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_questions_sql)
            .await?;

        let create_inspections_sql = r#"
            CREATE TABLE IF NOT EXISTS shopper_platform.inspections (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_id UUID NOT NULL
                    REFERENCES shopper_platform.users(id) ON DELETE CASCADE,
                questionnaire_id UUID NOT NULL
                    REFERENCES shopper_platform.questionnaires(id) ON DELETE RESTRICT,
                status shopper_platform.inspection_status NOT NULL DEFAULT 'transcribed',
                transcript TEXT,
                report_generated_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_inspections_sql)
            .await?;

        // One answer row per (inspection, question) pair. New extraction or
        // human input replaces the existing row rather than duplicating it.
        let create_answers_sql = r#"
            CREATE TABLE IF NOT EXISTS shopper_platform.answers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                inspection_id UUID NOT NULL
                    REFERENCES shopper_platform.inspections(id) ON DELETE CASCADE,
                question_id UUID NOT NULL
                    REFERENCES shopper_platform.questions(id) ON DELETE CASCADE,
                answer_text TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT answers_inspection_question_unique
                    UNIQUE(inspection_id, question_id)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_answers_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_questions_questionnaire_position
                    ON shopper_platform.questions(questionnaire_id, position)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_inspections_user
                    ON shopper_platform.inspections(user_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_answers_inspection
                    ON shopper_platform.answers(inspection_id)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS shopper_platform.answers")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS shopper_platform.inspections")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS shopper_platform.questions")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS shopper_platform.questionnaires")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS shopper_platform.users")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS shopper_platform.inspection_status")
            .await?;

        Ok(())
    }
}
