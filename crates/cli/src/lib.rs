//! # Weave CLI
//!
//! Command-line interface for Weave.
//!
//! Renders page files to static HTML outside the editor and checks them
//! for problems.
//!
//! ## Commands
//!
//! - `render` - Render one page to HTML
//! - `render-dir` - Render every page under a directory
//! - `validate` - Validate a page file
//! - `info` - Display information about a page
//!

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::{RenderInputs, render_page_html};
pub use weave_core;
pub use weave_ir;
pub use weave_render;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "weave", version, about = "Render and inspect Weave page files")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the render commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Render the live preview instead of the design canvas
    #[arg(long)]
    pub preview: bool,

    /// Target breakpoint (desktop, tablet, mobile)
    #[arg(long, default_value = "desktop")]
    pub breakpoint: String,

    /// Custom canvas width in pixels
    #[arg(long)]
    pub width: Option<f32>,

    /// Table fixtures for data repeaters
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// App/page variable values
    #[arg(long, value_name = "FILE")]
    pub variables: Option<PathBuf>,

    /// Render configuration (TOML)
    #[arg(long, value_name = "FILE", env = "WEAVE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a page file to HTML
    Render {
        /// Page file
        page: PathBuf,

        #[command(flatten)]
        args: RenderArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render every page file under a directory
    RenderDir {
        /// Directory to scan
        dir: PathBuf,

        #[command(flatten)]
        args: RenderArgs,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Validate a page file
    Validate {
        /// Page file
        page: PathBuf,
    },
    /// Display information about a page file
    Info {
        /// Page file
        page: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render { page, args, out } => commands::render(&page, &args, out.as_deref()).await,
        Commands::RenderDir { dir, args, out } => commands::render_dir(&dir, &args, &out).await,
        Commands::Validate { page } => commands::validate(&page),
        Commands::Info { page, json } => commands::info(&page, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "weave",
            "render",
            "home.weave",
            "--preview",
            "--breakpoint",
            "mobile",
            "--width",
            "390",
            "-o",
            "home.html",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { page, args, out } => {
                assert_eq!(page, PathBuf::from("home.weave"));
                assert!(args.preview);
                assert_eq!(args.breakpoint, "mobile");
                assert_eq!(args.width, Some(390.0));
                assert_eq!(out, Some(PathBuf::from("home.html")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["weave", "info", "a.weave", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }
}
