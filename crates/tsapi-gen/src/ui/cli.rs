use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};
use crate::utils::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "tsapi-gen")]
#[command(author, version, about = "TypeScript API layer generator for openapi-typescript declarations")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Inspect an interface description without generating anything
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate types, endpoints, API wrappers and hooks for the configured servers
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the JSON config file
  #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
  pub config: PathBuf,

  /// Only generate for these servers (repeatable)
  #[arg(short, long = "server", value_name = "NAME")]
  pub servers: Vec<String>,

  /// Output directory, overriding the config file
  #[arg(short, long, value_name = "DIR")]
  pub output: Option<PathBuf>,

  /// Enable verbose output with every warning
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
  pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
  /// Path to the openapi-typescript declaration file
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Tag whose paths are left out
  #[arg(short, long, value_name = "TAG")]
  pub exclude_tag: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every path with its tag, method and operationId
  Paths(SourceArgs),
  /// List tags with their path counts
  Tags(SourceArgs),
}
