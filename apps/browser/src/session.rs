//! Interactive browse loop: one home screen, one detail screen, a current route.

use std::sync::Arc;

use client_core::CharacterService;
use shared::domain::CharacterId;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::{
    config::Settings,
    navigation::Route,
    screens::{DetailScreen, HomeScreen},
};

const HELP: &str =
    "Commands: <id> open character, <route> go to route, b back, r reload, h help, q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Open(CharacterId),
    /// A route path such as `home` or `character_detail/42`.
    Go(Route),
    Back,
    Reload,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "b" | "back" => Input::Back,
        "r" | "reload" => Input::Reload,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => match other.parse::<Route>() {
            Ok(route) => Input::Go(route),
            Err(_) => other
                .trim_start_matches('#')
                .parse::<i64>()
                .map(|id| Input::Open(CharacterId(id)))
                .unwrap_or_else(|_| Input::Unknown(line.to_string())),
        },
    }
}

pub struct Browser {
    home: HomeScreen,
    detail: DetailScreen,
    route: Route,
    list_page: u32,
}

impl Browser {
    pub fn new(service: Arc<dyn CharacterService>, settings: &Settings) -> Self {
        Self {
            home: HomeScreen::new(Arc::clone(&service), settings.grid_columns),
            detail: DetailScreen::new(service),
            route: Route::Home,
            list_page: settings.list_page,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Shows `route`, starting a fresh load for it.
    pub async fn navigate(&mut self, route: Route) -> Vec<String> {
        debug!(from = %self.route, to = %route, "navigate");
        self.route = route;
        match route {
            Route::Home => self.home.activate(self.list_page),
            Route::CharacterDetail(id) => self.detail.activate(id),
        }
        self.render_settled().await
    }

    /// Returns the lines to print, or `None` when the user asked to quit.
    pub async fn handle(&mut self, input: Input) -> Option<Vec<String>> {
        let lines = match input {
            Input::Quit => return None,
            Input::Help => vec![HELP.to_string()],
            Input::Unknown(text) => vec![format!("Unknown command '{text}'. {HELP}")],
            Input::Go(route) => self.navigate(route).await,
            Input::Back => match self.route {
                Route::Home => vec!["Already on the character list.".to_string()],
                Route::CharacterDetail(_) => self.navigate(Route::Home).await,
            },
            Input::Reload => {
                match self.route {
                    Route::Home => self.home.reload(),
                    Route::CharacterDetail(_) => self.detail.reload(),
                };
                self.render_settled().await
            }
            Input::Open(id) => match self.route {
                Route::Home => match self.home.select(id) {
                    Some(route) => self.navigate(route).await,
                    None => vec![format!("No character #{id} on this page.")],
                },
                Route::CharacterDetail(_) => {
                    vec!["Go back to the list (b) before opening another character.".to_string()]
                }
            },
        };
        Some(lines)
    }

    async fn render_settled(&self) -> Vec<String> {
        match self.route {
            Route::Home => {
                let view = self.home.settled().await;
                self.home.render(&view)
            }
            Route::CharacterDetail(_) => self.detail.settled().await.render(),
        }
    }
}

/// Runs the browse loop on stdin until `q` or end of input.
pub async fn run(service: Arc<dyn CharacterService>, settings: &Settings) -> anyhow::Result<()> {
    let mut browser = Browser::new(service, settings);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let initial = browser.navigate(Route::Home).await;
    write_lines(&mut stdout, &initial).await?;
    write_lines(&mut stdout, &[HELP.to_string()]).await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match browser.handle(parse_input(&line)).await {
            Some(output) => write_lines(&mut stdout, &output).await?,
            None => break,
        }
    }
    Ok(())
}

pub async fn write_lines<W>(out: &mut W, lines: &[String]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for line in lines {
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await
}
