// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{StudioRepository, UserRepository},
    models::{
        auth::{Claims, CreateUserPayload, RegisterUserPayload, UpdateUserPayload, User, UserRole},
        quota::SubscriptionTier,
    },
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    studio_repo: StudioRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        studio_repo: StudioRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, studio_repo, jwt_secret, pool }
    }

    // O bcrypt é pesado: roda fora do executor assíncrono
    async fn hash_password(password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    /// Cadastro do site: cria o estúdio (plano starter) e o primeiro usuário dele,
    /// na mesma transação.
    pub async fn register_studio(&self, input: &RegisterUserPayload) -> Result<String, AppError> {
        let hashed_password = Self::hash_password(&input.password).await?;

        let mut tx = self.pool.begin().await?;

        let studio = self.studio_repo
            .create_studio(&mut *tx, &input.studio_name, SubscriptionTier::Starter.as_str())
            .await?;

        // Se falhar aqui (e-mail repetido), o estúdio criado acima é desfeito no drop
        let new_user = self.user_repo
            .create_user(
                &mut *tx,
                &input.email,
                &hashed_password,
                input.full_name.as_deref(),
                UserRole::StudioUser,
                Some(studio.id),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🏠 Estúdio '{}' cadastrado por {}", studio.name, new_user.email);

        self.create_token(new_user.id)
    }

    /// Criação de usuário pelo painel do admin.
    pub async fn create_user(&self, input: &CreateUserPayload) -> Result<User, AppError> {
        if let Some(studio_id) = input.studio_id {
            if !self.studio_repo.exists(studio_id).await? {
                return Err(AppError::StudioNotFound);
            }
        }

        let hashed_password = Self::hash_password(&input.password).await?;

        self.user_repo
            .create_user(
                &self.pool,
                &input.email,
                &hashed_password,
                input.full_name.as_deref(),
                input.role,
                input.studio_id,
            )
            .await
    }

    pub async fn update_user(&self, id: Uuid, input: &UpdateUserPayload) -> Result<User, AppError> {
        if let Some(studio_id) = input.studio_id {
            if !self.studio_repo.exists(studio_id).await? {
                return Err(AppError::StudioNotFound);
            }
        }

        self.user_repo.update_user(id, input).await
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.decode_token(token)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn decode_token(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    // Pool preguiçoso: não abre conexão, só serve para montar o serviço
    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/nao_usado")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            StudioRepository::new(pool.clone()),
            secret.to_string(),
            pool,
        )
    }

    #[tokio::test]
    async fn token_round_trips_the_user_id() {
        let auth = service("segredo-de-teste");
        let user_id = Uuid::new_v4();

        let token = auth.create_token(user_id).unwrap();

        assert_eq!(auth.decode_token(&token).unwrap(), user_id);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("um").create_token(Uuid::new_v4()).unwrap();

        let err = service("outro").decode_token(&token).unwrap_err();

        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        assert!(matches!(
            service("x").decode_token("nao.e.jwt"),
            Err(AppError::InvalidToken)
        ));
    }
}
