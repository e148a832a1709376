// src/db/project_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::project::{
        LinkMaterialPayload, Project, ProjectMaterial, ProjectMaterialEntry, ProjectPayload,
        ProjectStatus,
    },
};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_projects(&self, studio_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE studio_id = $1 ORDER BY created_at DESC",
        )
            .bind(studio_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    pub async fn find_project<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE studio_id = $1 AND id = $2",
        )
            .bind(studio_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(project)
    }

    pub async fn create_project(&self, studio_id: Uuid, input: &ProjectPayload) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (studio_id, name, client_name, status, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(studio_id)
            .bind(&input.name)
            .bind(input.client_name.as_deref())
            .bind(input.status.unwrap_or(ProjectStatus::Planning))
            .bind(input.notes.as_deref())
            .fetch_one(&self.pool)
            .await?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: &ProjectPayload,
    ) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = $3,
                client_name = $4,
                status = COALESCE($5, status),
                notes = $6,
                updated_at = NOW()
            WHERE studio_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(studio_id)
            .bind(id)
            .bind(&input.name)
            .bind(input.client_name.as_deref())
            .bind(input.status)
            .bind(input.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn delete_project(&self, studio_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProjectNotFound);
        }
        Ok(())
    }

    // ---
    // Ponte projeto x material
    // ---

    pub async fn link_material<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        input: &LinkMaterialPayload,
    ) -> Result<ProjectMaterial, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ProjectMaterial>(
            r#"
            INSERT INTO project_materials (project_id, material_id, quantity, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(project_id)
            .bind(input.material_id)
            .bind(input.quantity)
            .bind(input.notes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::MaterialAlreadyLinked;
                    }
                }
                e.into()
            })
    }

    pub async fn unlink_material(
        &self,
        studio_id: Uuid,
        project_id: Uuid,
        material_id: Uuid,
    ) -> Result<(), AppError> {
        // O JOIN com projects garante que o projeto é do estúdio
        let result = sqlx::query(
            r#"
            DELETE FROM project_materials pm
            USING projects p
            WHERE pm.project_id = p.id
              AND p.studio_id = $1
              AND pm.project_id = $2
              AND pm.material_id = $3
            "#,
        )
            .bind(studio_id)
            .bind(project_id)
            .bind(material_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::MaterialNotFound);
        }
        Ok(())
    }

    pub async fn list_project_materials<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMaterialEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, ProjectMaterialEntry>(
            r#"
            SELECT
                m.id AS material_id,
                m.name,
                m.category,
                m.subcategory,
                mf.name AS manufacturer_name,
                pm.quantity,
                pm.notes,
                pm.created_at AS linked_at
            FROM project_materials pm
            JOIN materials m ON m.id = pm.material_id
            LEFT JOIN manufacturers mf ON mf.id = m.manufacturer_id
            WHERE pm.project_id = $1
            ORDER BY m.category ASC, m.name ASC
            "#,
        )
            .bind(project_id)
            .fetch_all(executor)
            .await?;
        Ok(entries)
    }
}
