use std::sync::Arc;

use client_core::{CharacterService, LoadController, LoadState};
use shared::domain::{CharacterId, CharacterSummary, Page};

use super::{failure_info, fit, ViewStatus};
use crate::navigation::Route;

pub const BANNER_URL: &str =
    "https://cms.rhinoshield.app/public/images/ip_page_rick_and_morty_banner_mobile_de62ff184b.jpg";
const CELL_WIDTH: usize = 30;
const PAGE_NOT_FOUND: &str = "No characters on this page; check the API URL or page number.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCard {
    pub id: CharacterId,
    pub name: String,
    pub species_label: String,
    pub image_url: String,
}

impl From<&CharacterSummary> for CharacterCard {
    fn from(summary: &CharacterSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            species_label: format!("Specie: {}", summary.species),
            image_url: summary.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub status: ViewStatus,
    pub page: Option<u32>,
    pub cards: Vec<CharacterCard>,
}

impl HomeView {
    /// Cards only ever come from a `Loaded` state, so a failed reload shows
    /// nothing rather than the previous page.
    pub fn from_state(state: &LoadState<Page<CharacterSummary>>) -> Self {
        match state {
            LoadState::Idle => Self::empty(ViewStatus::Idle),
            LoadState::Loading => Self::empty(ViewStatus::Loading),
            LoadState::Loaded(page) => Self {
                status: ViewStatus::Ready,
                page: Some(page.page),
                cards: page.results.iter().map(CharacterCard::from).collect(),
            },
            LoadState::Failed(error) => Self::empty(ViewStatus::failed(error)),
        }
    }

    fn empty(status: ViewStatus) -> Self {
        Self {
            status,
            page: None,
            cards: Vec::new(),
        }
    }

    pub fn render(&self, columns: usize) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.status {
            ViewStatus::Idle => return lines,
            ViewStatus::Loading => {
                lines.push("Loading characters...".to_string());
                return lines;
            }
            ViewStatus::Ready | ViewStatus::Failed { .. } => {}
        }

        lines.push(format!("[banner] {BANNER_URL}"));
        lines.push(String::new());
        lines.extend(render_grid(&self.cards, columns));

        match &self.status {
            ViewStatus::Failed { hint, .. } => {
                lines.push(format!("Could not load characters. {hint}"));
            }
            _ => {
                lines.push(page_summary(self.page.unwrap_or(1), self.cards.len()));
            }
        }
        lines
    }
}

/// Lays cards out `columns` to a row. Names and species are clipped to the
/// cell; image URLs follow on their own lines so they stay usable.
fn render_grid(cards: &[CharacterCard], columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for row in cards.chunks(columns.max(1)) {
        let names = row
            .iter()
            .map(|card| fit(&format!("#{} {}", card.id, card.name), CELL_WIDTH));
        let species = row.iter().map(|card| fit(&card.species_label, CELL_WIDTH));
        lines.push(join_cells(names));
        lines.push(join_cells(species));
        for card in row {
            lines.push(format!("  [image #{}] {}", card.id, card.image_url));
        }
        lines.push(String::new());
    }
    lines
}

fn join_cells(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join("  ").trim_end().to_string()
}

fn page_summary(page: u32, count: usize) -> String {
    let noun = if count == 1 { "character" } else { "characters" };
    format!("Page {page}: {count} {noun}. Enter an id to open it.")
}

/// Grid listing of one page of characters.
pub struct HomeScreen {
    controller: LoadController<u32, Page<CharacterSummary>>,
    columns: usize,
}

impl HomeScreen {
    pub fn new(service: Arc<dyn CharacterService>, columns: usize) -> Self {
        let controller = LoadController::new(move |page: u32| {
            let service = Arc::clone(&service);
            async move {
                service
                    .fetch_page(page)
                    .await
                    .map_err(|err| failure_info(&err, PAGE_NOT_FOUND))
            }
        });
        Self {
            controller,
            columns: columns.max(1),
        }
    }

    pub fn activate(&self, page: u32) {
        self.controller.activate(page);
    }

    pub fn reload(&self) -> bool {
        self.controller.refresh()
    }

    pub fn state(&self) -> LoadState<Page<CharacterSummary>> {
        self.controller.state()
    }

    pub fn view(&self) -> HomeView {
        HomeView::from_state(&self.controller.state())
    }

    pub async fn settled(&self) -> HomeView {
        HomeView::from_state(&self.controller.settled().await)
    }

    pub fn render(&self, view: &HomeView) -> Vec<String> {
        view.render(self.columns)
    }

    /// Resolves a card on the current page to its detail route.
    pub fn select(&self, id: CharacterId) -> Option<Route> {
        self.view()
            .cards
            .iter()
            .find(|card| card.id == id)
            .map(|card| Route::CharacterDetail(card.id))
    }
}
