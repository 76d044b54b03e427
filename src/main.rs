use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facematch::{build_engine, config, FileEngine, MatchDecision};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "facematch")]
#[command(version, about = "Face enrollment and recognition against a local gallery")]
struct Cli {
    /// Config file (defaults to the built-in path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a person so they can be enrolled
    Register {
        /// Person ID (a new UUID if omitted)
        #[arg(short, long)]
        person: Option<String>,
    },
    /// Enroll a person from detector reports, one per capture
    Enroll {
        #[arg(short, long)]
        person: String,
        captures: Vec<PathBuf>,
    },
    /// Identify the face in a single capture
    Recognize {
        /// Print the full decision as JSON
        #[arg(long)]
        json: bool,
        capture: PathBuf,
    },
    /// Show whether a person is enrolled
    Status {
        #[arg(short, long)]
        person: String,
    },
    /// Remove a person's enrolled faces
    Purge {
        #[arg(short, long)]
        person: String,
        /// Also forget the person entirely
        #[arg(long)]
        forget: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_effective(cli.config.as_deref())?;

    match cli.command {
        Commands::Register { person } => register(&build_engine(&cfg)?, person),
        Commands::Enroll { person, captures } => {
            enroll(&build_engine(&cfg)?, &person, &captures)
        }
        Commands::Recognize { json, capture } => recognize(&build_engine(&cfg)?, &capture, json),
        Commands::Status { person } => status(&build_engine(&cfg)?, &person),
        Commands::Purge { person, forget } => purge(&build_engine(&cfg)?, &person, forget),
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&cfg)?);
            Ok(())
        }
    }
}

fn read_capture(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading capture {}", path.display()))
}

fn register(engine: &FileEngine, person: Option<String>) -> Result<()> {
    let person_id = person.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if engine.gallery().register(&person_id)? {
        info!("Registered person: {}", person_id);
    } else {
        warn!("Person already registered: {}", person_id);
    }
    println!("{person_id}");
    Ok(())
}

fn enroll(engine: &FileEngine, person_id: &str, captures: &[PathBuf]) -> Result<()> {
    info!("Enrolling person: {}", person_id);

    let images = captures
        .iter()
        .map(|p| read_capture(p))
        .collect::<Result<Vec<_>>>()?;

    let outcome = engine
        .enroll(person_id, &images)
        .with_context(|| format!("Failed to enroll {person_id}"))?;

    info!(
        "✓ Enrolled {} with {} reference captures",
        person_id, outcome.count
    );
    Ok(())
}

fn recognize(engine: &FileEngine, capture: &Path, json: bool) -> Result<()> {
    let image = read_capture(capture)?;
    let decision = engine
        .recognize(&image)
        .context("Failed to read the gallery")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    match &decision {
        MatchDecision::Matched { .. } => info!("✓ {}", decision),
        MatchDecision::NoMatch { .. } => warn!("{}", decision),
        MatchDecision::Rejected { .. } => warn!("Capture {}", decision),
    }
    if let Some(person_id) = decision.person_id() {
        println!("{person_id}");
    }
    Ok(())
}

fn status(engine: &FileEngine, person_id: &str) -> Result<()> {
    let enrolled = engine.is_enrolled(person_id)?;
    info!(
        "{}: {}",
        person_id,
        if enrolled { "enrolled" } else { "not enrolled" }
    );
    println!("{enrolled}");
    Ok(())
}

fn purge(engine: &FileEngine, person_id: &str, forget: bool) -> Result<()> {
    info!("Purging enrolled faces for person: {}", person_id);

    if forget {
        engine
            .gallery()
            .purge(person_id)
            .context("Failed to remove person")?;
    } else {
        engine.purge(person_id).context("Failed to purge face records")?;
    }

    info!("✓ Purged person: {}", person_id);
    Ok(())
}
