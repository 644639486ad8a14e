// src/services/passkey_service.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use webauthn_rs::prelude::{
    CreationChallengeResponse, PasskeyAuthentication, PasskeyRegistration, PublicKeyCredential,
    RegisterPublicKeyCredential, RequestChallengeResponse, Webauthn, WebauthnBuilder,
};

use crate::{
    common::error::AppError,
    config::WebauthnConfig,
    db::PasskeyRepository,
    models::passkey::{
        transports_from_response, ChallengeKind, NewAuthenticator, CHALLENGE_TTL_MINUTES,
    },
};

// O admin não tem linha no banco; o handle WebAuthn é derivado do username
fn user_handle(username: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, username.as_bytes())
}

#[derive(Clone)]
pub struct PasskeyService {
    webauthn: Arc<Webauthn>,
    repo: PasskeyRepository,
}

impl PasskeyService {
    pub fn new(config: &WebauthnConfig, repo: PasskeyRepository) -> anyhow::Result<Self> {
        let webauthn = WebauthnBuilder::new(&config.rp_id, &config.rp_origin)?
            .rp_name(&config.rp_name)
            .build()?;

        Ok(Self {
            webauthn: Arc::new(webauthn),
            repo,
        })
    }

    async fn take_challenge(&self, username: &str, kind: ChallengeKind) -> Result<Value, AppError> {
        let not_before = Utc::now() - chrono::Duration::minutes(CHALLENGE_TTL_MINUTES);
        self.repo
            .take_latest_challenge(username, kind, not_before)
            .await?
            .ok_or(AppError::ChallengeMissing)
    }

    // ---
    // Cadastro
    // ---

    pub async fn registration_options(
        &self,
        username: &str,
    ) -> Result<CreationChallengeResponse, AppError> {
        let existing = self.repo.list_for_user(username).await?;
        let exclude = existing
            .iter()
            .map(|auth| auth.passkey.cred_id().clone())
            .collect::<Vec<_>>();

        let (options, state) = self.webauthn.start_passkey_registration(
            user_handle(username),
            username,
            username,
            Some(exclude),
        )?;

        let state = serde_json::to_value(&state).map_err(anyhow::Error::from)?;
        self.repo
            .save_challenge(username, ChallengeKind::Registration, state)
            .await?;

        Ok(options)
    }

    /// Recebe o JSON bruto do navegador para conseguir ler `transports`,
    /// que o tipo do webauthn-rs não guarda.
    pub async fn verify_registration(&self, username: &str, raw: Value) -> Result<(), AppError> {
        let state = self.take_challenge(username, ChallengeKind::Registration).await?;
        let state: PasskeyRegistration =
            serde_json::from_value(state).map_err(anyhow::Error::from)?;

        let transports = transports_from_response(&raw);
        let credential: RegisterPublicKeyCredential = serde_json::from_value(raw)
            .map_err(|e| AppError::MalformedBody(e.to_string()))?;

        let passkey = self
            .webauthn
            .finish_passkey_registration(&credential, &state)?;

        let authenticator = self
            .repo
            .create(&NewAuthenticator::from_passkey(username, passkey, transports))
            .await?;

        tracing::info!(
            "🔑 Passkey cadastrada para {} ({})",
            username,
            authenticator.device_type
        );
        Ok(())
    }

    // ---
    // Login
    // ---

    pub async fn authentication_options(
        &self,
        username: &str,
    ) -> Result<RequestChallengeResponse, AppError> {
        let authenticators = self.repo.list_for_user(username).await?;
        if authenticators.is_empty() {
            return Err(AppError::PasskeyNotRegistered);
        }

        let passkeys = authenticators
            .into_iter()
            .map(|auth| auth.passkey.0)
            .collect::<Vec<_>>();

        let (options, state) = self.webauthn.start_passkey_authentication(&passkeys)?;

        let state = serde_json::to_value(&state).map_err(anyhow::Error::from)?;
        self.repo
            .save_challenge(username, ChallengeKind::Authentication, state)
            .await?;

        Ok(options)
    }

    /// Confere a assinatura e atualiza contador/backup da credencial usada.
    pub async fn verify_authentication(
        &self,
        username: &str,
        credential: &PublicKeyCredential,
    ) -> Result<(), AppError> {
        let state = self
            .take_challenge(username, ChallengeKind::Authentication)
            .await?;
        let state: PasskeyAuthentication =
            serde_json::from_value(state).map_err(anyhow::Error::from)?;

        let result = self
            .webauthn
            .finish_passkey_authentication(credential, &state)?;

        let mut authenticator = self
            .repo
            .list_for_user(username)
            .await?
            .into_iter()
            .find(|auth| auth.passkey.cred_id() == result.cred_id())
            .ok_or(AppError::PasskeyNotRegistered)?;

        authenticator.passkey.0.update_credential(&result);

        self.repo
            .record_usage(
                &authenticator.credential_id,
                &authenticator.passkey.0,
                i64::from(result.counter()),
                result.backup_state(),
            )
            .await?;

        tracing::info!("🔓 Login com passkey para {}", username);
        Ok(())
    }
}
