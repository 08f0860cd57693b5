#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operator CLI for the municipal comparison toolchain.
//!
//! Every subcommand reads JSON from disk and writes JSON to stdout, so the
//! steps compose: `build` a set of cities from a fixture, then `rank`
//! them. `inspect` shows what the classification heuristics pick on a
//! table, which is the starting point for writing overrides.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Compare municipalities on official statistics.
#[derive(Parser)]
#[command(name = "city_compare")]
#[command(about = "Compare municipalities on official statistics")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the axes and codes detected on a classification tree.
    Inspect {
        /// JSON array of classification axes.
        tree: PathBuf,
    },

    /// Build city indicators from a fixture of statistical tables.
    Build {
        /// JSON fixture of the form `{"tables": {"<id>": {...}}}`.
        fixture: PathBuf,

        /// Table holding population by age.
        #[arg(long)]
        population_table: String,

        /// Domain table as `domain=table_id` (e.g. `crime=0000020211`).
        #[arg(long = "table", value_parser = commands::parse_domain_table)]
        tables: Vec<(city_compare_indicator::Domain, String)>,

        /// Most periods to try per table, newest first.
        #[arg(long, default_value_t = city_compare_indicator::DEFAULT_MAX_FALLBACK_YEARS)]
        max_fallback_years: usize,

        /// Municipality names to compare.
        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Score and rank cities from a JSON array of city indicators.
    Rank {
        /// JSON array of city indicators.
        indicators: PathBuf,

        /// Weight preset name.
        #[arg(long, default_value = city_compare_scoring::DEFAULT_PRESET)]
        preset: String,

        /// Year confidence is judged against (default: this year).
        #[arg(long)]
        year: Option<i32>,

        /// Restrict scoring to these indicator IDs.
        #[arg(long = "indicator")]
        indicator_ids: Vec<String>,
    },

    /// List the built-in weight presets.
    Presets,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { tree } => commands::inspect(&tree),
        Commands::Build {
            fixture,
            population_table,
            tables,
            max_fallback_years,
            cities,
        } => {
            commands::build(
                &fixture,
                &population_table,
                &tables,
                max_fallback_years,
                &cities,
            )
            .await
        }
        Commands::Rank {
            indicators,
            preset,
            year,
            indicator_ids,
        } => commands::rank(&indicators, preset, year, indicator_ids),
        Commands::Presets => {
            commands::presets();
            Ok(())
        }
    }
}
