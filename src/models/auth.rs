// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ADMIN_ROLE: &str = "admin";

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin")]
    pub role: String,
    pub iat: usize, // Issued At
    pub exp: usize, // Expiration time
}

// Dados para login. Campos ausentes viram 400, não erro de desserialização.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    #[schema(example = "admin")]
    pub username: Option<String>,
    #[serde(default)]
    #[schema(example = "rahasia")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminProfile {
    pub username: String,
    pub role: String,
}

// Resposta de autenticação com o token (senha ou passkey)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AdminProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: Claims,
}
