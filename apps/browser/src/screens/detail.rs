use std::sync::Arc;

use client_core::{CharacterService, LoadController, LoadState};
use shared::domain::{CharacterDetail, CharacterId};

use super::{failure_info, fit, ViewStatus};

const LABEL_WIDTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub status: ViewStatus,
    pub id: Option<CharacterId>,
    pub image_url: Option<String>,
    pub rows: Vec<(&'static str, String)>,
}

impl DetailView {
    pub fn from_state(state: &LoadState<CharacterDetail>) -> Self {
        match state {
            LoadState::Idle => Self::empty(ViewStatus::Idle),
            LoadState::Loading => Self::empty(ViewStatus::Loading),
            LoadState::Loaded(detail) => Self {
                status: ViewStatus::Ready,
                id: Some(detail.id),
                image_url: Some(detail.image_url.clone()),
                rows: detail_rows(detail),
            },
            LoadState::Failed(error) => Self::empty(ViewStatus::failed(error)),
        }
    }

    fn empty(status: ViewStatus) -> Self {
        Self {
            status,
            id: None,
            image_url: None,
            rows: Vec::new(),
        }
    }

    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn render(&self) -> Vec<String> {
        match &self.status {
            ViewStatus::Idle => Vec::new(),
            ViewStatus::Loading => vec!["Loading character...".to_string()],
            ViewStatus::Failed { hint, detail } => vec![
                "Could not load this character.".to_string(),
                format!("  {hint}"),
                format!("  ({detail})"),
            ],
            ViewStatus::Ready => {
                let mut lines = Vec::with_capacity(self.rows.len() + 2);
                if let Some(image_url) = &self.image_url {
                    lines.push(format!("[image] {image_url}"));
                    lines.push(String::new());
                }
                for (label, value) in &self.rows {
                    lines.push(format!("{} {value}", fit(label, LABEL_WIDTH)));
                }
                lines
            }
        }
    }
}

fn detail_rows(detail: &CharacterDetail) -> Vec<(&'static str, String)> {
    vec![
        ("Name", detail.name.clone()),
        ("Species", detail.species.clone()),
        ("Status", detail.status.clone()),
        ("Gender", detail.gender.clone()),
        ("Type", detail.kind.clone()),
        ("Episode", detail.episode_count.to_string()),
        ("Location", detail.location_name.clone()),
        ("Origin", detail.origin_name.clone()),
    ]
}

/// Detail table for a single character, keyed by its id.
pub struct DetailScreen {
    controller: LoadController<CharacterId, CharacterDetail>,
}

impl DetailScreen {
    pub fn new(service: Arc<dyn CharacterService>) -> Self {
        let controller = LoadController::new(move |id: CharacterId| {
            let service = Arc::clone(&service);
            async move {
                service
                    .fetch_by_id(id)
                    .await
                    .map_err(|err| failure_info(&err, "Character not found."))
            }
        });
        Self { controller }
    }

    pub fn activate(&self, id: CharacterId) {
        self.controller.activate(id);
    }

    pub fn reload(&self) -> bool {
        self.controller.refresh()
    }

    pub fn active_id(&self) -> Option<CharacterId> {
        self.controller.active_key()
    }

    pub fn state(&self) -> LoadState<CharacterDetail> {
        self.controller.state()
    }

    pub async fn settled(&self) -> DetailView {
        DetailView::from_state(&self.controller.settled().await)
    }
}
