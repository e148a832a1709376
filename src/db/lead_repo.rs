// src/db/lead_repo.rs

use sqlx::{Executor, Postgres};
use crate::{
    common::error::AppError,
    models::lead::{CreateLeadPayload, Lead},
};

#[derive(Clone, Default)]
pub struct LeadRepository;

impl LeadRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_lead<'e, E>(&self, executor: E, input: &CreateLeadPayload) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (email, full_name, company, source, message)
            VALUES (LOWER($1), $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(&input.email)
            .bind(input.full_name.as_deref())
            .bind(input.company.as_deref())
            .bind(input.source.as_deref())
            .bind(input.message.as_deref())
            .fetch_one(executor)
            .await?;
        Ok(lead)
    }
}
