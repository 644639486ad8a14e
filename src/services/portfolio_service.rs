// src/services/portfolio_service.rs

use std::{path::PathBuf, sync::Arc};

use validator::Validate;

use crate::{
    common::error::AppError,
    db::ProjectRepository,
    models::project::{
        select_new_entries, sort_pinned_first, Category, FixtureProject, MigrationReport, Project,
        ProjectKey, ProjectPayload,
    },
    services::blob::BlobStore,
};

/// Resultado da limpeza dos arquivos de um projeto.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AssetPurge {
    pub attempted: usize,
    pub failed: usize,
}

/// Apaga do storage cada URL gerenciada do projeto. Falhas só são logadas:
/// a remoção do projeto segue mesmo assim.
pub async fn purge_project_assets(store: &dyn BlobStore, project: &Project) -> AssetPurge {
    let mut purge = AssetPurge::default();

    for url in project.asset_urls() {
        if !store.is_managed_url(url) {
            continue;
        }
        purge.attempted += 1;
        if let Err(e) = store.delete(url).await {
            purge.failed += 1;
            tracing::warn!("⚠️ Falha ao apagar {} do blob: {}", url, e);
        }
    }

    purge
}

pub async fn load_fixture(path: &std::path::Path) -> Result<Vec<FixtureProject>, AppError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::FixtureMissing)
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Falha ao ler o fixture").into()),
    };

    let entries = serde_json::from_str::<Vec<FixtureProject>>(&raw)
        .map_err(|e| anyhow::anyhow!("Fixture do portfólio inválido: {}", e))?;
    Ok(entries)
}

#[derive(Clone)]
pub struct PortfolioService {
    repo: ProjectRepository,
    blob_store: Arc<dyn BlobStore>,
    fixture_path: PathBuf,
}

impl PortfolioService {
    pub fn new(repo: ProjectRepository, blob_store: Arc<dyn BlobStore>, fixture_path: PathBuf) -> Self {
        Self {
            repo,
            blob_store,
            fixture_path,
        }
    }

    /// Listagem pública. Com a tabela vazia, tenta popular a partir do
    /// fixture antes de listar.
    pub async fn list(&self, category: Option<Category>) -> Result<Vec<Project>, AppError> {
        if self.repo.count().await? == 0 {
            match self.migrate().await {
                Ok(report) => tracing::info!("🌱 Portfólio populado com {} projetos", report.inserted),
                Err(e) => tracing::warn!("⚠️ Não foi possível popular o portfólio: {}", e),
            }
        }

        let mut projects = self.repo.list(category).await?;
        sort_pinned_first(&mut projects);
        Ok(projects)
    }

    pub async fn get(&self, key: &ProjectKey) -> Result<Project, AppError> {
        self.repo.find(key).await?.ok_or(AppError::ProjectNotFound)
    }

    pub async fn create(&self, payload: ProjectPayload) -> Result<Project, AppError> {
        let payload = payload.normalized();
        payload.validate()?;
        let project = self.repo.create(&payload).await?;
        tracing::info!("🎬 Projeto '{}' criado", project.title);
        Ok(project)
    }

    pub async fn update(
        &self,
        key: &ProjectKey,
        payload: ProjectPayload,
    ) -> Result<Project, AppError> {
        let payload = payload.normalized();
        payload.validate()?;
        self.repo
            .update(key, &payload)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn delete(&self, key: &ProjectKey) -> Result<(), AppError> {
        let project = self.get(key).await?;

        let purge = purge_project_assets(self.blob_store.as_ref(), &project).await;
        if purge.failed > 0 {
            tracing::warn!(
                "Projeto {} removido com {} de {} arquivos ainda no blob",
                project.id,
                purge.failed,
                purge.attempted
            );
        }

        if !self.repo.delete(project.id).await? {
            return Err(AppError::ProjectNotFound);
        }
        tracing::info!("🗑️ Projeto '{}' removido", project.title);
        Ok(())
    }

    /// Importa as entradas do fixture que ainda não existem.
    pub async fn migrate(&self) -> Result<MigrationReport, AppError> {
        let fixture = load_fixture(&self.fixture_path).await?;
        let existing = self.repo.existing_keys().await?;

        let new_entries = select_new_entries(&existing, &fixture);
        let inserted = self.repo.insert_fixture_entries(&new_entries).await?;

        Ok(MigrationReport {
            inserted,
            skipped: fixture.len() as u64 - inserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::{tests::project, Pinned};
    use crate::services::blob::{is_managed_blob_url, StoredBlob};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SUFFIX: &str = ".blob.vercel-storage.com";

    // Storage falso que registra as remoções e falha para URLs com "falha"
    #[derive(Default)]
    struct RecordingStore {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn put(&self, _: &str, _: &str, _: Vec<u8>) -> Result<StoredBlob, AppError> {
            Err(AppError::BlobStorage("não usado".into()))
        }

        async fn delete(&self, url: &str) -> Result<(), AppError> {
            self.deleted.lock().unwrap().push(url.to_string());
            if url.contains("falha") {
                return Err(AppError::BlobStorage("503".into()));
            }
            Ok(())
        }

        fn is_managed_url(&self, url: &str) -> bool {
            is_managed_blob_url(url, SUFFIX)
        }
    }

    fn project_with_assets() -> Project {
        let mut p = project("Senja", Pinned::No);
        p.thumbnail = "https://x.public.blob.vercel-storage.com/thumb.jpg".into();
        p.photo1 = Some("https://x.public.blob.vercel-storage.com/falha.jpg".into());
        p.photo2 = Some("https://i.ytimg.com/vi/abc/hq.jpg".into());
        p.photo3 = Some("https://x.public.blob.vercel-storage.com/3.jpg".into());
        p
    }

    #[tokio::test]
    async fn deletes_every_managed_url() {
        let store = RecordingStore::default();
        let purge = purge_project_assets(&store, &project_with_assets()).await;

        assert_eq!(purge, AssetPurge { attempted: 3, failed: 1 });
        assert_eq!(
            *store.deleted.lock().unwrap(),
            [
                "https://x.public.blob.vercel-storage.com/thumb.jpg",
                "https://x.public.blob.vercel-storage.com/falha.jpg",
                "https://x.public.blob.vercel-storage.com/3.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn project_without_managed_assets_touches_nothing() {
        let store = RecordingStore::default();
        let purge = purge_project_assets(&store, &project("x", Pinned::Yes)).await;

        assert_eq!(purge, AssetPurge::default());
        assert!(store.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bundled_fixture_loads() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/portfolio.json");
        let fixture = load_fixture(&path).await.unwrap();

        assert!(!fixture.is_empty());
        assert!(fixture.iter().any(|entry| entry.project.pinned.is_pinned()));
    }

    #[tokio::test]
    async fn missing_fixture_is_reported() {
        let result = load_fixture(std::path::Path::new("/nao/existe/portfolio.json")).await;
        assert!(matches!(result, Err(AppError::FixtureMissing)));
    }
}
