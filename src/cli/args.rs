// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for envplate

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envplate")]
#[command(about = "Render configuration files from environment-derived data")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template file
    Render {
        #[arg(help = "Path to template file")]
        template: PathBuf,

        #[arg(short, long, help = "Output file (defaults to stdout)")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Directory of fragments available to include")]
        partials: Option<PathBuf>,

        #[arg(
            short = 'D',
            long = "var",
            help = "Set template variables (key=value)"
        )]
        vars: Vec<String>,

        #[arg(long, help = "Fail on missing variables")]
        strict: bool,
    },

    /// Check that a template and its fragments compile
    Check {
        #[arg(help = "Path to template file")]
        template: PathBuf,

        #[arg(short, long, help = "Directory of fragments available to include")]
        partials: Option<PathBuf>,
    },

    /// List the functions available to templates
    Functions,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format
    pub fn parse_variables(
        vars: &[String],
    ) -> anyhow::Result<std::collections::HashMap<String, String>> {
        let mut variables = std::collections::HashMap::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                variables.insert(key.to_string(), value.to_string());
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}
