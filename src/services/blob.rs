// src/services/blob.rs

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{common::error::AppError, config::BlobConfig};

// Versão da API do Vercel Blob que usamos
const BLOB_API_VERSION: &str = "7";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    pub url: String,
    #[serde(default)]
    pub pathname: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Armazenamento de arquivos públicos (fotos do portfólio).
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, AppError>;

    async fn delete(&self, url: &str) -> Result<(), AppError>;

    /// URLs que pertencem a este storage e podem ser apagadas.
    fn is_managed_url(&self, url: &str) -> bool;
}

/// `true` para URLs https cujo host termina com o sufixo do storage.
pub fn is_managed_blob_url(url: &str, host_suffix: &str) -> bool {
    if host_suffix.is_empty() {
        return false;
    }
    Url::parse(url)
        .ok()
        .filter(|parsed| parsed.scheme() == "https")
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .is_some_and(|host| host.ends_with(host_suffix))
}

pub struct VercelBlobStore {
    client: reqwest::Client,
    config: BlobConfig,
}

impl VercelBlobStore {
    pub fn new(config: BlobConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn token(&self) -> Result<&str, AppError> {
        self.config
            .token
            .as_deref()
            .ok_or_else(|| AppError::BlobStorage("BLOB_READ_WRITE_TOKEN não configurado".into()))
    }

    fn endpoint(&self, pathname: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| AppError::BlobStorage(format!("BLOB_API_URL inválida: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::BlobStorage("BLOB_API_URL não aceita caminho".into()))?
            .pop_if_empty()
            .push(pathname);
        Ok(url)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::BlobStorage(format!("{}: {}", status.as_u16(), body)))
    }
}

#[async_trait]
impl BlobStore for VercelBlobStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, AppError> {
        let token = self.token()?;

        let response = self
            .client
            .put(self.endpoint(filename)?)
            .bearer_auth(token)
            .header("x-api-version", BLOB_API_VERSION)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "1")
            .body(bytes)
            .send()
            .await?;

        let blob = Self::check_status(response).await?.json::<StoredBlob>().await?;
        tracing::info!("📦 Arquivo enviado para o blob: {}", blob.url);
        Ok(blob)
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let token = self.token()?;

        let response = self
            .client
            .post(self.endpoint("delete")?)
            .bearer_auth(token)
            .header("x-api-version", BLOB_API_VERSION)
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    fn is_managed_url(&self, url: &str) -> bool {
        is_managed_blob_url(url, &self.config.host_suffix)
    }
}
