use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ApiClient, ViewController};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;
mod config;
mod render;

use command::{parse_command, Command};
use config::load_settings;
use render::{help_text, prompt, render};

#[derive(Parser, Debug)]
#[command(name = "iris-desktop", about = "Interactive client for the Iris species prediction API")]
struct Args {
    /// Base URL of the prediction API; overrides the config file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Path to a TOML config file (defaults to ./iris.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref(), args.api_url.as_deref())?;
    info!(api_url = %settings.api_url, timeout_secs = settings.request_timeout_secs, "starting client");

    let client = ApiClient::with_timeout(settings.api_url.as_str(), settings.request_timeout())
        .context("failed to build HTTP client")?;
    let mut controller = ViewController::new(Arc::new(client), settings.api_url.as_str());

    let mut stdout = io::stdout();
    write!(stdout, "{}", render(&controller.render().await))?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        write!(stdout, "{}", prompt(controller.state()))?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => writeln!(stdout, "{}", help_text(controller.state()))?,
            Ok(Some(Command::Action(action))) => {
                let view = controller.dispatch(action).await;
                write!(stdout, "{}", render(&view))?;
            }
            Err(err) => writeln!(stdout, "[error] {err}")?,
        }
    }

    info!("client exiting");
    Ok(())
}
