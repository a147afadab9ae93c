//! Command-line interface for mpcfill-drive.
//!
//! `list` resolves a Drive share link, lists it (optionally recursively), prints the
//! result and can write an MPCFill manifest. `combine` merges manifests written earlier.
//!
//! Scraping, manifest building and merging live in `mpcfill-drive-core`; this module
//! only maps flags and config onto those calls and handles files and printing.

use crate::load_config::load_config;
use crate::output::{render_listing, resolve_input, resolve_output, write_manifest};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mpcfill_drive_core::combine::{combine, CombineOverrides};
use mpcfill_drive_core::config::Config;
use mpcfill_drive_core::contract::PageFetcher;
use mpcfill_drive_core::directive::{parse_card_multiples, parse_double_sided, CardSlotDirective};
use mpcfill_drive_core::drive::DriveEntry;
use mpcfill_drive_core::fetch::HttpFetcher;
use mpcfill_drive_core::generate::{generate, ManifestSettings};
use mpcfill_drive_core::identity;
use mpcfill_drive_core::manifest::Manifest;
use mpcfill_drive_core::traverse::traverse;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// CLI for mpcfill-drive: list public Drive folders and build MPCFill orders.
#[derive(Parser, Debug)]
#[clap(
    name = "mpcfill-drive",
    version,
    about = "List public Google Drive folders and build MPCFill XML orders from their images"
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[clap(long, global = true)]
    pub verbose: bool,

    /// Optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a Drive folder or file and optionally write an MPCFill manifest
    List(ListArgs),
    /// Merge several MPCFill manifests into one
    Combine(CombineArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Google Drive folder or file link
    pub url: String,

    /// Descend into subfolders
    #[clap(long)]
    pub recursive: bool,

    /// Maximum subfolder depth with --recursive (config default: 5)
    #[clap(long)]
    pub max_depth: Option<u32>,

    /// Comma-separated names to skip (folders exact, files ignoring case)
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Write an MPCFill manifest here; bare names go to the output directory
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Card stock for the manifest
    #[clap(long)]
    pub stock: Option<String>,

    /// Mark the manifest as foil
    #[clap(long)]
    pub foil: bool,

    /// Drive id of the shared cardback image
    #[clap(long)]
    pub cardback: Option<String>,

    /// Double-sided pairs: "front.png|back.png;front2.png|back2.png"
    #[clap(long)]
    pub double_sided: Option<String>,

    /// Repeated cards or pairs: "card.png|3;front.png|back.png"
    #[clap(long)]
    pub card_multiples: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CombineArgs {
    /// Manifests to merge, in order; bare names are also looked up in the output directory
    #[clap(required = true)]
    pub files: Vec<PathBuf>,

    /// Combined manifest path; bare names go to the output directory
    #[clap(short, long)]
    pub output: PathBuf,

    /// Override the stock of the first manifest
    #[clap(long)]
    pub stock: Option<String>,

    /// Force foil on
    #[clap(long, conflicts_with = "no_foil")]
    pub foil: bool,

    /// Force foil off
    #[clap(long)]
    pub no_foil: bool,

    /// Override the cardback of the first manifest
    #[clap(long)]
    pub cardback: Option<String>,

    /// Keep the largest input bracket instead of recomputing it
    #[clap(long)]
    pub no_auto_bracket: bool,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.trace_loaded();

    match cli.command {
        Commands::List(args) => {
            let fetcher = HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?;
            list_with(&fetcher, &config, &args).await.map(|_| ())
        }
        Commands::Combine(args) => combine_files(&config, &args).map(|_| ()),
    }
}

/// `list` against any fetcher. Returns the manifest path when one was written.
pub async fn list_with<F>(fetcher: &F, config: &Config, args: &ListArgs) -> Result<Option<PathBuf>>
where
    F: PageFetcher + ?Sized,
{
    // Directives are validated before any request is made.
    let directives = parse_directives(args)?;
    let target = identity::extract(&args.url)?;
    let excluded: HashSet<String> = args
        .exclude
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    let max_depth = if args.recursive {
        args.max_depth.unwrap_or(config.traversal.max_depth)
    } else {
        0
    };
    info!(command = "list", id = %target.id, kind = %target.kind, recursive = args.recursive, max_depth, "Listing Drive resource");

    let traversal = traverse(fetcher, &target, max_depth, &excluded)
        .await
        .with_context(|| format!("Failed to list {}", args.url))?;
    for failure in &traversal.failures {
        eprintln!(
            "Warning: could not list folder '{}' ({}): {}",
            failure.name, failure.id, failure.error
        );
    }

    let excluded_files: HashSet<String> = excluded.iter().map(|name| name.to_lowercase()).collect();
    let entries: Vec<DriveEntry> = traversal
        .entries
        .into_iter()
        .filter(|entry| entry.is_folder() || !excluded_files.contains(&entry.name.to_lowercase()))
        .collect();
    if entries.is_empty() {
        warn!(url = %args.url, "No files or folders found; the link may be private or the page layout unrecognized");
    }
    print!("{}", render_listing(&entries));

    let Some(output) = &args.output else {
        return Ok(None);
    };
    let settings = ManifestSettings {
        stock: args.stock.clone().unwrap_or_else(|| config.manifest.stock.clone()),
        foil: args.foil || config.manifest.foil,
        cardback: args
            .cardback
            .clone()
            .unwrap_or_else(|| config.manifest.cardback.clone()),
        bracket_override: None,
    };
    let generated = generate(&entries, &directives, &settings)?;
    for unresolved in &generated.unresolved {
        eprintln!("Warning: {unresolved}");
    }

    let path = resolve_output(output, &config.output_dir);
    write_manifest(&generated.manifest, &path)?;
    println!(
        "Manifest written to {} ({} cards, bracket {})",
        path.display(),
        generated.manifest.card_count(),
        generated.manifest.bracket
    );
    Ok(Some(path))
}

fn parse_directives(args: &ListArgs) -> Result<Vec<CardSlotDirective>> {
    let mut directives = Vec::new();
    if let Some(spec) = &args.double_sided {
        directives.extend(parse_double_sided(spec).context("Invalid --double-sided value")?);
    }
    if let Some(spec) = &args.card_multiples {
        directives.extend(parse_card_multiples(spec).context("Invalid --card-multiples value")?);
    }
    Ok(directives)
}

/// `combine`: reads every input that exists and parses, merges them, writes the result.
/// Returns the path written.
pub fn combine_files(config: &Config, args: &CombineArgs) -> Result<PathBuf> {
    let mut manifests: Vec<Manifest> = Vec::new();
    for input in &args.files {
        let Some(path) = resolve_input(input, &config.output_dir) else {
            warn!(input = %input.display(), "Input manifest not found, skipping");
            eprintln!("Warning: {} not found, skipping", input.display());
            continue;
        };
        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|xml| Manifest::from_xml(&xml).map_err(anyhow::Error::from));
        match parsed {
            Ok(manifest) => {
                info!(input = %path.display(), slots = manifest.slots.len(), "Loaded manifest");
                manifests.push(manifest);
            }
            Err(e) => {
                warn!(input = %path.display(), error = %e, "Skipping unreadable manifest");
                eprintln!("Warning: skipping {}: {e}", path.display());
            }
        }
    }

    let foil = match (args.foil, args.no_foil) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    let overrides = CombineOverrides {
        stock: args.stock.clone(),
        foil,
        cardback: args.cardback.clone(),
        auto_bracket: !args.no_auto_bracket,
    };
    let combined = combine(&manifests, &overrides)?;

    let path = resolve_output(&args.output, &config.output_dir);
    write_manifest(&combined, &path)?;
    println!(
        "Combined {} manifests into {} ({} cards, bracket {})",
        manifests.len(),
        path.display(),
        combined.card_count(),
        combined.bracket
    );
    Ok(path)
}
