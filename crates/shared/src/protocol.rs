//! Wire shapes of the character API and their conversion into domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CharacterDetail, CharacterId, CharacterSummary, Page};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedResourceRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPayload {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub species: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: NamedResourceRef,
    #[serde(default)]
    pub location: NamedResourceRef,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl CharacterPayload {
    pub fn into_summary(self) -> CharacterSummary {
        CharacterSummary {
            id: CharacterId(self.id),
            name: self.name,
            species: self.species,
            image_url: self.image,
        }
    }

    pub fn into_detail(self) -> CharacterDetail {
        CharacterDetail {
            id: CharacterId(self.id),
            episode_count: self.episode.len(),
            name: self.name,
            species: self.species,
            image_url: self.image,
            status: self.status,
            gender: self.gender,
            kind: self.kind,
            origin_name: self.origin.name,
            location_name: self.location.name,
            created: self.created,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfoPayload {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPageResponse {
    #[serde(default)]
    pub info: PageInfoPayload,
    pub results: Vec<CharacterPayload>,
}

impl CharacterPageResponse {
    /// Converts the listing into summaries, stamping the page that was asked for.
    pub fn into_page(self, requested_page: u32) -> Page<CharacterSummary> {
        Page {
            page: requested_page,
            total_count: self.info.count,
            total_pages: self.info.pages,
            has_next: self.info.next.is_some(),
            has_prev: self.info.prev.is_some(),
            results: self
                .results
                .into_iter()
                .map(CharacterPayload::into_summary)
                .collect(),
        }
    }
}
