use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CharacterService, RickMortyClient};
use shared::domain::CharacterId;
use tracing_subscriber::EnvFilter;

mod config;
mod navigation;
mod screens;
mod session;

use config::Settings;
use screens::{DetailScreen, HomeScreen};

#[derive(Parser, Debug)]
#[command(name = "browser", about = "Browse Rick and Morty characters from the terminal")]
struct Args {
    /// Overrides the API base url from config/env.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the character grid.
    List {
        /// Page number, starting at 1.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
    },
    /// Print the detail table of one character.
    Show { id: i64 },
    /// Interactive list/detail navigation on stdin.
    Browse,
}

fn build_service(settings: &Settings) -> Result<Arc<dyn CharacterService>> {
    let client = match settings.request_timeout() {
        Some(timeout) => RickMortyClient::with_timeout(&settings.api_base_url, timeout),
        None => RickMortyClient::new(&settings.api_base_url),
    }
    .context("failed to set up character API client")?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }
    let service = build_service(&settings)?;
    let mut stdout = tokio::io::stdout();

    match args.command.unwrap_or(Command::Browse) {
        Command::List { page } => {
            let home = HomeScreen::new(service, settings.grid_columns);
            home.activate(page.unwrap_or(settings.list_page));
            let view = home.settled().await;
            session::write_lines(&mut stdout, &home.render(&view)).await?;
        }
        Command::Show { id } => {
            let detail = DetailScreen::new(service);
            detail.activate(CharacterId(id));
            let view = detail.settled().await;
            session::write_lines(&mut stdout, &view.render()).await?;
        }
        Command::Browse => session::run(service, &settings).await?,
    }

    Ok(())
}
