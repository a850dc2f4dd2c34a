//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// plinth static site builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Input directory path (relative to project root)
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Config file name (default: plinth.toml)
    #[arg(short = 'C', long, default_value = "plinth.toml", global = true)]
    pub config: PathBuf,

    /// Log every written file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,

    /// Minify the html content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site into the output directory
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build the site, then serve the output directory
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Interface to bind on
        #[arg(long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["plinth", "build", "--clean"]);
        assert!(!cli.is_serve());
        assert_eq!(cli.config, PathBuf::from("plinth.toml"));
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build command");
        };
        assert!(build_args.clean);
        assert_eq!(build_args.minify, None);
    }

    #[test]
    fn test_parse_minify_flag_forms() {
        let cli = Cli::parse_from(["plinth", "build", "--minify"]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(build_args.minify, Some(true));

        let cli = Cli::parse_from(["plinth", "build", "--minify", "false"]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(build_args.minify, Some(false));
    }

    #[test]
    fn test_parse_serve_with_globals_after_subcommand() {
        let cli = Cli::parse_from(["plinth", "serve", "--port", "3000", "-o", "dist", "-v"]);
        assert!(cli.is_serve());
        assert!(cli.verbose);
        assert_eq!(cli.output, Some(PathBuf::from("dist")));
        let Commands::Serve { port, interface, .. } = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(port, Some(3000));
        assert_eq!(interface, None);
    }
}
