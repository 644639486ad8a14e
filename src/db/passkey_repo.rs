// src/db/passkey_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use webauthn_rs::prelude::Passkey;

use crate::{
    common::error::AppError,
    models::passkey::{Authenticator, ChallengeKind, NewAuthenticator},
};

const AUTHENTICATOR_COLUMNS: &str = r#"
    id, username, credential_id, passkey, counter, device_type, backed_up,
    transports, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PasskeyRepository {
    pool: PgPool,
}

impl PasskeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Authenticators
    // ---

    pub async fn list_for_user(&self, username: &str) -> Result<Vec<Authenticator>, AppError> {
        let sql = format!(
            "SELECT {} FROM authenticators WHERE username = $1 ORDER BY created_at ASC",
            AUTHENTICATOR_COLUMNS
        );
        let authenticators = sqlx::query_as::<_, Authenticator>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(authenticators)
    }

    pub async fn create(&self, new: &NewAuthenticator) -> Result<Authenticator, AppError> {
        let sql = format!(
            r#"
            INSERT INTO authenticators (
                username, credential_id, passkey, counter, device_type,
                backed_up, transports
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            AUTHENTICATOR_COLUMNS
        );

        sqlx::query_as::<_, Authenticator>(&sql)
            .bind(&new.username)
            .bind(&new.credential_id)
            .bind(Json(&new.passkey))
            .bind(new.counter)
            .bind(&new.device_type)
            .bind(new.backed_up)
            .bind(&new.transports)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::PasskeyAlreadyRegistered;
                    }
                }
                e.into()
            })
    }

    /// Grava a passkey atualizada depois de um login (contador e backup).
    pub async fn record_usage(
        &self,
        credential_id: &str,
        passkey: &Passkey,
        counter: i64,
        backed_up: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE authenticators
            SET passkey = $2, counter = $3, backed_up = $4, updated_at = NOW()
            WHERE credential_id = $1
            "#,
        )
        .bind(credential_id)
        .bind(Json(passkey))
        .bind(counter)
        .bind(backed_up)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---
    // Desafios
    // ---

    pub async fn save_challenge(
        &self,
        username: &str,
        kind: ChallengeKind,
        state: Value,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO webauthn_challenges (username, kind, state) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(kind.as_str())
            .bind(Json(state))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove todos os desafios desse tipo do usuário e devolve o mais recente
    /// que ainda não expirou. Consumir é sempre destrutivo: um desafio nunca
    /// é usado duas vezes, e os expirados somem junto.
    pub async fn take_latest_challenge(
        &self,
        username: &str,
        kind: ChallengeKind,
        not_before: DateTime<Utc>,
    ) -> Result<Option<Value>, AppError> {
        let rows: Vec<(Json<Value>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            DELETE FROM webauthn_challenges
            WHERE username = $1 AND kind = $2
            RETURNING state, created_at
            "#,
        )
        .bind(username)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter(|(_, created_at)| *created_at >= not_before)
            .max_by_key(|(_, created_at)| *created_at)
            .map(|(Json(state), _)| state))
    }
}
