// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::auth::{UpdateUserPayload, User, UserRole},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_users(&self, studio_id: Option<Uuid>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::uuid IS NULL OR studio_id = $1)
            ORDER BY email ASC
            "#,
        )
            .bind(studio_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Cria um novo usuário (aceita pool ou transação)
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: UserRole,
        studio_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, studio_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(email)
            .bind(password_hash)
            .bind(full_name)
            .bind(role)
            .bind(studio_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Converte erro de violação de chave única em um erro mais amigável
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })
    }

    pub async fn update_user(&self, id: Uuid, input: &UpdateUserPayload) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                role = COALESCE($3, role),
                studio_id = COALESCE($4, studio_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(input.full_name.as_deref())
            .bind(input.role)
            .bind(input.studio_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
