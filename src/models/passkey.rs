// src/models/passkey.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use webauthn_rs::prelude::Passkey;

// Desafios WebAuthn valem 5 minutos
pub const CHALLENGE_TTL_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    Registration,
    Authentication,
}

impl ChallengeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeKind::Registration => "registration",
            ChallengeKind::Authentication => "authentication",
        }
    }
}

// Credencial cadastrada do admin
#[derive(Debug, Clone, FromRow)]
pub struct Authenticator {
    pub id: Uuid,
    pub username: String,
    pub credential_id: String,
    pub passkey: Json<Passkey>,
    pub counter: i64,
    pub device_type: String,
    pub backed_up: bool,
    pub transports: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuthenticator {
    pub username: String,
    pub credential_id: String,
    pub passkey: Passkey,
    pub counter: i64,
    pub device_type: String,
    pub backed_up: bool,
    pub transports: Vec<String>,
}

impl NewAuthenticator {
    /// Monta o registro a partir da passkey recém-verificada. O tipo de
    /// dispositivo e o backup vêm da forma serializada, que é a única que
    /// expõe essas flags.
    pub fn from_passkey(username: &str, passkey: Passkey, transports: Vec<String>) -> Self {
        let serialized = serde_json::to_value(&passkey).unwrap_or(Value::Null);

        let credential_id =
            credential_id_string(serde_json::to_value(passkey.cred_id()).ok().as_ref());
        let counter = serialized
            .pointer("/cred/counter")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let backup_eligible = serialized
            .pointer("/cred/backup_eligible")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let backed_up = serialized
            .pointer("/cred/backup_state")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            username: username.to_string(),
            credential_id,
            passkey,
            counter,
            device_type: device_type(backup_eligible).to_string(),
            backed_up,
            transports,
        }
    }
}

/// ID da credencial como texto (base64url), igual ao que o navegador devolve.
pub fn credential_id_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Credenciais sincronizáveis (iCloud, Google) são "multiDevice".
pub fn device_type(backup_eligible: bool) -> &'static str {
    if backup_eligible {
        "multiDevice"
    } else {
        "singleDevice"
    }
}

/// Lê `response.transports` do JSON bruto enviado pelo navegador.
pub fn transports_from_response(raw: &Value) -> Vec<String> {
    raw.pointer("/response/transports")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationVerified {
    pub success: bool,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_transports_from_browser_payload() {
        let raw = json!({
            "id": "abc",
            "response": { "transports": ["internal", "hybrid", 3] }
        });
        assert_eq!(transports_from_response(&raw), ["internal", "hybrid"]);
        assert!(transports_from_response(&json!({ "response": {} })).is_empty());
    }

    #[test]
    fn device_type_follows_backup_eligibility() {
        assert_eq!(device_type(true), "multiDevice");
        assert_eq!(device_type(false), "singleDevice");
    }

    #[test]
    fn challenge_kinds_match_the_database_check() {
        assert_eq!(ChallengeKind::Registration.as_str(), "registration");
        assert_eq!(ChallengeKind::Authentication.as_str(), "authentication");
    }
}
