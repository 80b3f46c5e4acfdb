#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the tactics sandbox from text intents.

mod config;
mod intent;
mod session;
mod text_backend;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tactics_sandbox_core::WELCOME_BANNER;
use tactics_sandbox_rendering::RenderingBackend;
use tracing_subscriber::EnvFilter;

use crate::{
    config::SandboxConfig,
    session::{Flow, Session},
    text_backend::TextBackend,
};

/// Grid tactics sandbox driven by line-oriented intents.
#[derive(Debug, Parser)]
#[command(name = "tactics-sandbox", version, about)]
struct CliArgs {
    /// TOML file providing grid, weight and range settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for terrain generation and spawning.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of columns in the initial grid.
    #[arg(long)]
    width: Option<u32>,
    /// Number of rows in the initial grid.
    #[arg(long)]
    height: Option<u32>,
    /// Reads intents from FILE instead of standard input.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
}

/// Entry point for the tactics sandbox command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };
    config.override_with(args.seed, args.width, args.height);
    tracing::info!(?config, "starting sandbox");

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open script {}", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    println!("{WELCOME_BANNER}");
    let mut session = Session::new(config.world_config())?;
    let mut backend = TextBackend::new(io::stdout());
    run(&mut session, &mut backend, input)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run<B, R>(session: &mut Session, backend: &mut B, input: R) -> Result<()>
where
    B: RenderingBackend,
    R: BufRead,
{
    backend.present(&session.scene())?;

    for (number, line) in input.lines().enumerate() {
        let line = line.context("failed to read intent")?;
        let intent = match intent::parse(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!(line = number + 1, %error, "skipping intent");
                continue;
            }
        };

        let mut notices = Vec::new();
        let flow = session.dispatch(intent, &mut notices);
        for notice in notices {
            println!("{notice}");
        }
        match flow {
            Flow::Continue => {}
            Flow::Render => backend.present(&session.scene())?,
            Flow::Quit => break,
        }
    }
    Ok(())
}
