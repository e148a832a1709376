// src/services/project_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MaterialRepository, ProjectRepository},
    models::project::{
        LinkMaterialPayload, Project, ProjectMaterial, ProjectMaterialEntry, ProjectPayload,
    },
};

#[derive(Clone)]
pub struct ProjectService {
    project_repo: ProjectRepository,
    material_repo: MaterialRepository,
    pool: PgPool,
}

impl ProjectService {
    pub fn new(project_repo: ProjectRepository, material_repo: MaterialRepository, pool: PgPool) -> Self {
        Self { project_repo, material_repo, pool }
    }

    pub async fn list_projects(&self, studio_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.project_repo.list_projects(studio_id).await
    }

    pub async fn get_project(&self, studio_id: Uuid, id: Uuid) -> Result<Project, AppError> {
        self.project_repo
            .find_project(&self.pool, studio_id, id)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn create_project(&self, studio_id: Uuid, input: &ProjectPayload) -> Result<Project, AppError> {
        self.project_repo.create_project(studio_id, input).await
    }

    pub async fn update_project(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: &ProjectPayload,
    ) -> Result<Project, AppError> {
        self.project_repo.update_project(studio_id, id, input).await
    }

    pub async fn delete_project(&self, studio_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.project_repo.delete_project(studio_id, id).await
    }

    /// Vincula um material ao projeto. Projeto e material precisam ser do estúdio.
    pub async fn link_material(
        &self,
        studio_id: Uuid,
        project_id: Uuid,
        input: &LinkMaterialPayload,
    ) -> Result<ProjectMaterial, AppError> {
        let mut tx = self.pool.begin().await?;

        self.project_repo
            .find_project(&mut *tx, studio_id, project_id)
            .await?
            .ok_or(AppError::ProjectNotFound)?;

        self.material_repo
            .find_material(&mut *tx, studio_id, input.material_id)
            .await?
            .ok_or(AppError::MaterialNotFound)?;

        let link = self.project_repo
            .link_material(&mut *tx, project_id, input)
            .await?;

        tx.commit().await?;
        Ok(link)
    }

    pub async fn unlink_material(
        &self,
        studio_id: Uuid,
        project_id: Uuid,
        material_id: Uuid,
    ) -> Result<(), AppError> {
        self.project_repo.unlink_material(studio_id, project_id, material_id).await
    }

    pub async fn list_project_materials(
        &self,
        studio_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMaterialEntry>, AppError> {
        let mut conn = self.pool.acquire().await?;

        self.project_repo
            .find_project(&mut *conn, studio_id, project_id)
            .await?
            .ok_or(AppError::ProjectNotFound)?;

        self.project_repo.list_project_materials(&mut *conn, project_id).await
    }
}
