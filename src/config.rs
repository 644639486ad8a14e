// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use url::Url;

use crate::{
    common::i18n::I18nStore,
    db::{InvoiceRepository, PasskeyRepository, ProjectRepository},
    services::{
        auth::AuthService,
        blob::{BlobStore, VercelBlobStore},
        invoice_service::InvoiceService,
        passkey_service::PasskeyService,
        portfolio_service::PortfolioService,
    },
};

// Senha do admin: texto puro (ADMIN_PASSWORD) ou hash bcrypt (ADMIN_PASSWORD_HASH)
#[derive(Debug, Clone)]
pub enum AdminPassword {
    Plain(String),
    Bcrypt(String),
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: AdminPassword,
}

#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub token: Option<String>,
    pub api_url: String,
    pub host_suffix: String,
}

#[derive(Debug, Clone)]
pub struct WebauthnConfig {
    pub rp_id: String,
    pub rp_origin: Url,
    pub rp_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub admin: AdminCredentials,
    pub blob: BlobConfig,
    pub webauthn: WebauthnConfig,
    pub cors_origins: Vec<String>,
    pub fixture_path: PathBuf,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_required(key: &str) -> anyhow::Result<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("{} deve ser definida", key))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let jwt_ttl_days: i64 = env_or("JWT_TTL_DAYS", "7")
            .parse()
            .context("JWT_TTL_DAYS deve ser um número inteiro")?;

        let password = match (env::var("ADMIN_PASSWORD_HASH").ok(), env::var("ADMIN_PASSWORD").ok()) {
            (Some(hash), _) if !hash.trim().is_empty() => AdminPassword::Bcrypt(hash),
            (_, Some(plain)) if !plain.is_empty() => AdminPassword::Plain(plain),
            _ => anyhow::bail!("ADMIN_PASSWORD ou ADMIN_PASSWORD_HASH deve ser definida"),
        };

        let rp_origin = Url::parse(&env_or("WEBAUTHN_ORIGIN", "http://localhost:5173"))
            .context("WEBAUTHN_ORIGIN não é uma URL válida")?;

        let cors_origins = env_or("CORS_ORIGIN", "http://localhost:5173")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let environment = match env_or("APP_ENV", "production").as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl: chrono::Duration::days(jwt_ttl_days),
            admin: AdminCredentials {
                username: env_or("ADMIN_USERNAME", "admin"),
                password,
            },
            blob: BlobConfig {
                token: env::var("BLOB_READ_WRITE_TOKEN").ok().filter(|t| !t.is_empty()),
                api_url: env_or("BLOB_API_URL", "https://blob.vercel-storage.com"),
                host_suffix: env_or("BLOB_HOST_SUFFIX", ".blob.vercel-storage.com"),
            },
            webauthn: WebauthnConfig {
                rp_id: env_or("WEBAUTHN_RP_ID", "localhost"),
                rp_origin,
                rp_name: env_or("WEBAUTHN_RP_NAME", "Just Jeje"),
            },
            cors_origins,
            fixture_path: PathBuf::from(env_or("PORTFOLIO_FIXTURE_PATH", "fixtures/portfolio.json")),
            environment,
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "3001").parse().context("PORT inválida")?,
            body_limit_bytes: env_or("BODY_LIMIT_BYTES", "10485760")
                .parse()
                .context("BODY_LIMIT_BYTES inválido")?,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Endereço inválido {}:{}", self.host, self.port))
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub passkey_service: PasskeyService,
    pub invoice_service: InvoiceService,
    pub portfolio_service: PortfolioService,
    pub blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let blob_store: Arc<dyn BlobStore> = Arc::new(VercelBlobStore::new(config.blob.clone()));
        Self::from_parts(config, db_pool, blob_store)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        config: Config,
        db_pool: PgPool,
        blob_store: Arc<dyn BlobStore>,
    ) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load(config.environment == Environment::Development)?;

        let auth_service = AuthService::new(
            config.admin.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl,
        );
        let passkey_service =
            PasskeyService::new(&config.webauthn, PasskeyRepository::new(db_pool.clone()))?;
        let invoice_service = InvoiceService::new(InvoiceRepository::new(db_pool.clone()));
        let portfolio_service = PortfolioService::new(
            ProjectRepository::new(db_pool.clone()),
            blob_store.clone(),
            config.fixture_path.clone(),
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            passkey_service,
            invoice_service,
            portfolio_service,
            blob_store,
        })
    }
}
