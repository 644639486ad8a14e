// src/db/project_repo.rs

use std::collections::HashSet;

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::project::{Category, FixtureProject, Project, ProjectKey, ProjectPayload},
};

const PROJECT_COLUMNS: &str = r#"
    id, legacy_id, title, date, category, thumbnail, photo1, photo2, photo3,
    youtube_url, description, project_info, pinned, created_at, updated_at
"#;

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Projetos em ordem de inserção. A ordenação por pin fica no serviço.
    pub async fn list(&self, category: Option<Category>) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM projects
            WHERE ($1::project_category IS NULL OR category = $1)
            ORDER BY position ASC
            "#,
            PROJECT_COLUMNS
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Aceita o UUID ou o ID legado
    pub async fn find(&self, key: &ProjectKey) -> Result<Option<Project>, AppError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 OR legacy_id = $2 LIMIT 1",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(key.uuid())
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Todos os IDs conhecidos: UUIDs e IDs legados.
    pub async fn existing_keys(&self) -> Result<HashSet<String>, AppError> {
        let rows: Vec<(Uuid, Option<String>)> =
            sqlx::query_as("SELECT id, legacy_id FROM projects")
                .fetch_all(&self.pool)
                .await?;

        let mut keys = HashSet::with_capacity(rows.len() * 2);
        for (id, legacy_id) in rows {
            keys.insert(id.to_string());
            if let Some(legacy_id) = legacy_id {
                keys.insert(legacy_id);
            }
        }
        Ok(keys)
    }

    // ---
    // Escrita
    // ---

    async fn insert<'e, E>(
        &self,
        executor: E,
        legacy_id: Option<&str>,
        payload: &ProjectPayload,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO projects (
                legacy_id, title, date, category, thumbnail, photo1, photo2,
                photo3, youtube_url, description, project_info, pinned
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (legacy_id) DO NOTHING
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(legacy_id)
            .bind(&payload.title)
            .bind(&payload.date)
            .bind(payload.category)
            .bind(&payload.thumbnail)
            .bind(&payload.photo1)
            .bind(&payload.photo2)
            .bind(&payload.photo3)
            .bind(&payload.youtube_url)
            .bind(&payload.description)
            .bind(payload.project_info.as_ref().map(Json))
            .bind(payload.pinned)
            .fetch_optional(executor)
            .await?;
        Ok(project)
    }

    pub async fn create(&self, payload: &ProjectPayload) -> Result<Project, AppError> {
        // Sem legacy_id não há conflito possível, então sempre volta uma linha
        self.insert(&self.pool, None, payload)
            .await?
            .ok_or_else(|| anyhow::anyhow!("INSERT em projects não retornou linha").into())
    }

    /// Insere as entradas do fixture numa transação. Entradas cujo ID legado
    /// já existe são ignoradas pelo `ON CONFLICT`. Retorna quantas entraram.
    pub async fn insert_fixture_entries(
        &self,
        entries: &[&FixtureProject],
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for entry in entries {
            let payload = entry.project.clone().normalized();
            if self
                .insert(&mut *tx, Some(&entry.id), &payload)
                .await?
                .is_some()
            {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Substituição completa. `None` quando a chave não existe.
    pub async fn update(
        &self,
        key: &ProjectKey,
        payload: &ProjectPayload,
    ) -> Result<Option<Project>, AppError> {
        let sql = format!(
            r#"
            UPDATE projects SET
                title = $3,
                date = $4,
                category = $5,
                thumbnail = $6,
                photo1 = $7,
                photo2 = $8,
                photo3 = $9,
                youtube_url = $10,
                description = $11,
                project_info = $12,
                pinned = $13,
                updated_at = NOW()
            WHERE id = $1 OR legacy_id = $2
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );

        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(key.uuid())
            .bind(key.as_str())
            .bind(&payload.title)
            .bind(&payload.date)
            .bind(payload.category)
            .bind(&payload.thumbnail)
            .bind(&payload.photo1)
            .bind(&payload.photo2)
            .bind(&payload.photo3)
            .bind(&payload.youtube_url)
            .bind(&payload.description)
            .bind(payload.project_info.as_ref().map(Json))
            .bind(payload.pinned)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
