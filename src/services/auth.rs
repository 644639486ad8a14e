// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    config::{AdminCredentials, AdminPassword},
    models::auth::{AdminProfile, Claims, ADMIN_ROLE},
};

// Só existe um usuário: o admin configurado no ambiente
#[derive(Clone)]
pub struct AuthService {
    admin: AdminCredentials,
    jwt_secret: String,
    jwt_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(admin: AdminCredentials, jwt_secret: String, jwt_ttl: chrono::Duration) -> Self {
        Self {
            admin,
            jwt_secret,
            jwt_ttl,
        }
    }

    pub fn admin_username(&self) -> &str {
        &self.admin.username
    }

    pub fn admin_profile(&self) -> AdminProfile {
        AdminProfile {
            username: self.admin.username.clone(),
            role: ADMIN_ROLE.to_string(),
        }
    }

    /// Confere usuário e senha e devolve um token novo.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, AppError> {
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => (u.trim(), p),
            _ => return Err(AppError::MissingCredentials),
        };

        if username != self.admin.username {
            return Err(AppError::InvalidCredentials);
        }

        let is_password_valid = match &self.admin.password {
            AdminPassword::Plain(expected) => password == expected,
            AdminPassword::Bcrypt(hash) => {
                let password_clone = password.to_owned();
                let hash_clone = hash.clone();

                // Executa a verificação em um thread separado
                tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??
            }
        };

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.issue_token()
    }

    pub fn issue_token(&self) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.jwt_ttl;

        let claims = Claims {
            username: self.admin.username.clone(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Assinatura, expiração e papel. Qualquer falha vira `InvalidToken`.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        if token_data.claims.role != ADMIN_ROLE {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn service_with(password: AdminPassword, ttl: chrono::Duration) -> AuthService {
        AuthService::new(
            AdminCredentials {
                username: "admin".to_string(),
                password,
            },
            "segredo-de-teste".to_string(),
            ttl,
        )
    }

    fn service() -> AuthService {
        service_with(AdminPassword::Plain("rahasia".into()), chrono::Duration::days(7))
    }

    #[tokio::test]
    async fn login_issues_a_token_that_validates() {
        let auth = service();
        let token = auth.login(Some("admin"), Some("rahasia")).await.unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn wrong_password_or_user_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.login(Some("admin"), Some("salah")).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(Some("root"), Some("rahasia")).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn blank_fields_are_a_bad_request() {
        let auth = service();
        assert!(matches!(
            auth.login(Some(" "), Some("rahasia")).await,
            Err(AppError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login(Some("admin"), None).await,
            Err(AppError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn bcrypt_hash_is_accepted() {
        let hash = bcrypt::hash("rahasia", 4).unwrap();
        let auth = service_with(AdminPassword::Bcrypt(hash), chrono::Duration::days(7));

        assert!(auth.login(Some("admin"), Some("rahasia")).await.is_ok());
        assert!(matches!(
            auth.login(Some("admin"), Some("salah")).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = service_with(
            AdminPassword::Plain("rahasia".into()),
            chrono::Duration::seconds(-60),
        );
        let token = auth.issue_token().unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service();
        let token = auth.issue_token().unwrap();

        // Troca um caractere da assinatura
        let mut chars: Vec<char> = token.chars().collect();
        let last = chars.len() - 2;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(auth.validate_token(&tampered), Err(AppError::InvalidToken)));

        let other = AuthService::new(
            AdminCredentials {
                username: "admin".into(),
                password: AdminPassword::Plain("x".into()),
            },
            "outro-segredo".into(),
            chrono::Duration::days(7),
        );
        assert!(matches!(
            other.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }
}
