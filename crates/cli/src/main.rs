mod cmd;
mod config;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kdeploy_lib::manifest::Artifact;

use crate::cmd::{cmd_cleanup, cmd_deploy, cmd_deps};
use crate::config::ConfigArgs;
use crate::output::{OutputFormat, print_error};

/// kdeploy - Deploy kustomize overlays to Kubernetes
#[derive(Parser)]
#[command(name = "kdeploy")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  config: ConfigArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the overlay, rewrite images, add labels and apply
  Deploy {
    /// Built image to substitute, as NAME=TAG (repeatable)
    #[arg(short, long = "image", value_name = "NAME=TAG", value_parser = parse_artifact)]
    images: Vec<Artifact>,

    /// Extra label for every resource, as KEY=VALUE (repeatable)
    #[arg(short, long = "label", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    labels: Vec<(String, String)>,
  },

  /// Delete everything the overlay deploys
  Cleanup,

  /// List the files the overlay depends on
  Deps {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
  match s.split_once('=') {
    Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
    _ => Err(format!("expected KEY=VALUE, got '{s}'")),
  }
}

fn parse_artifact(s: &str) -> Result<Artifact, String> {
  let (name, tag) = parse_key_val(s)?;
  if tag.is_empty() {
    return Err(format!("missing tag for image '{name}'"));
  }
  Ok(Artifact::new(name, tag))
}

fn init_logging(verbose: bool) {
  let default = if verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let result = cli.config.load().and_then(|config| match cli.command {
    Commands::Deploy { images, labels } => cmd_deploy(&config, &images, labels),
    Commands::Cleanup => cmd_cleanup(&config),
    Commands::Deps { format } => cmd_deps(&config, format),
  });

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
