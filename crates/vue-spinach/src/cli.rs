//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Convert Vue components from the Options API to the Composition API.
#[derive(Debug, Parser)]
#[command(name = "vue-spinach")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Component files or directories to transform
    #[arg(default_value = ".")]
    pub inputs: Vec<Utf8PathBuf>,

    /// Write the result to this file instead of in place (single input file only)
    #[arg(long, short)]
    pub out: Option<Utf8PathBuf>,

    /// Path to spinach.config.{json,js,mjs,ts}
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Generate a setup() function instead of <script setup>
    #[arg(long = "no-script-setup")]
    pub no_script_setup: bool,

    /// Use $ref/$computed from the reactivity transform
    #[arg(long = "reactivity-transform")]
    pub reactivity_transform: bool,

    /// Keep `props.x` instead of destructuring defineProps()
    #[arg(long = "no-props-destructure")]
    pub no_props_destructure: bool,

    /// Rewrite generated imports from one module to another
    #[arg(long = "alias", value_name = "FROM=TO", value_parser = parse_alias)]
    pub aliases: Vec<(String, String)>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print transformed components instead of writing them
    #[arg(long, conflicts_with_all = ["out", "check"])]
    pub stdout: bool,

    /// Report components that would change without writing them
    #[arg(long, conflicts_with = "out")]
    pub check: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Log transformation details to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

fn parse_alias(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.to_string(), to.to_string()))
        }
        _ => Err(format!("expected FROM=TO, got `{value}`")),
    }
}
