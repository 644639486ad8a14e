// src/models/project.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Film,
    Commission,
    NonCommission,
}

// No JSON o pin continua sendo a string "yes"/"no"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pinned_flag", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Pinned {
    Yes,
    #[default]
    No,
}

impl Pinned {
    pub fn is_pinned(self) -> bool {
        self == Pinned::Yes
    }
}

// --- Structs ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[schema(example = "Senja di Pelabuhan")]
    pub name: Option<String>,
    #[schema(example = "Short Film")]
    pub category_full: Option<String>,
    #[schema(example = "Editor")]
    pub role: Option<String>,
    #[schema(example = "Festival Film Pendek Jogja 2024")]
    pub fest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,

    // ID legado do portfolio.json (ex: "senja-di-pelabuhan")
    #[schema(example = "senja-di-pelabuhan")]
    pub legacy_id: Option<String>,

    #[schema(example = "Senja di Pelabuhan")]
    pub title: String,

    // Texto livre ("Agustus 2024", "2023", ...)
    #[schema(example = "Agustus 2024")]
    pub date: String,

    pub category: Category,

    pub thumbnail: String,
    pub photo1: Option<String>,
    pub photo2: Option<String>,
    pub photo3: Option<String>,

    #[schema(example = "https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    pub youtube_url: String,

    pub description: Option<String>,

    #[schema(value_type = Option<ProjectInfo>)]
    pub project_info: Option<Json<ProjectInfo>>,

    pub pinned: Pinned,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Thumbnail + fotos preenchidas, na ordem em que aparecem na página.
    pub fn asset_urls(&self) -> Vec<&str> {
        std::iter::once(self.thumbnail.as_str())
            .chain(self.photo1.as_deref())
            .chain(self.photo2.as_deref())
            .chain(self.photo3.as_deref())
            .filter(|url| !url.trim().is_empty())
            .collect()
    }
}

/// Fixados primeiro. `sort_by_key` é estável, então a ordem de inserção é
/// mantida dentro de cada grupo.
pub fn sort_pinned_first(projects: &mut [Project]) {
    projects.sort_by_key(|project| !project.pinned.is_pinned());
}

// Payload de criação/atualização (substituição completa)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    #[serde(default)]
    pub date: String,

    pub category: Category,

    #[serde(default)]
    pub thumbnail: String,

    #[serde(default)]
    pub photo1: Option<String>,
    #[serde(default)]
    pub photo2: Option<String>,
    #[serde(default)]
    pub photo3: Option<String>,

    #[serde(default)]
    pub youtube_url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub project_info: Option<ProjectInfo>,

    #[serde(default)]
    pub pinned: Pinned,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProjectPayload {
    /// O form do admin manda "" para campos vazios; guardamos NULL.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            date: self.date.trim().to_string(),
            thumbnail: self.thumbnail.trim().to_string(),
            photo1: blank_to_none(self.photo1),
            photo2: blank_to_none(self.photo2),
            photo3: blank_to_none(self.photo3),
            youtube_url: self.youtube_url.trim().to_string(),
            description: blank_to_none(self.description),
            ..self
        }
    }
}

// Entrada do portfolio.json: o payload normal + o ID legado
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureProject {
    pub id: String,
    #[serde(flatten)]
    pub project: ProjectPayload,
}

/// Chave de busca de projeto. Aceita tanto o UUID do banco quanto o ID
/// legado; a resolução acontece em um único lugar, no repositório.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectKey {
    raw: String,
    uuid: Option<Uuid>,
}

impl ProjectKey {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::ProjectIdRequired);
        }
        Ok(Self {
            raw: raw.to_string(),
            uuid: Uuid::parse_str(raw).ok(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }
}

/// Entradas do fixture que ainda não existem no banco (por ID legado ou
/// UUID). Duplicatas dentro do próprio fixture entram uma vez só.
pub fn select_new_entries<'a>(
    existing: &HashSet<String>,
    fixture: &'a [FixtureProject],
) -> Vec<&'a FixtureProject> {
    let mut seen = HashSet::new();
    fixture
        .iter()
        .filter(|entry| !existing.contains(entry.id.as_str()))
        .filter(|entry| seen.insert(entry.id.as_str()))
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MigrationReport {
    pub inserted: u64,
    pub skipped: u64,
}
