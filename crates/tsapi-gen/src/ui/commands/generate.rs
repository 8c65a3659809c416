use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, Timelike};
use crossterm::style::Stylize;
use num_format::{Locale, ToFormattedString};

use crate::{
  generator::{
    codegen::{ArtifactKind, ArtifactSet, GeneratedArtifact},
    config::Feature,
    metrics::GenerationStats,
    orchestrator::{Orchestrator, RunSummary},
  },
  ui::{Colors, cli::GenerateCommand, colors::Role},
  utils::config::{ConfigFile, ServerConfig},
};

const SCHEMA_FILE: &str = "schema.d.ts";

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

fn count(value: usize) -> String {
  value.to_formatted_string(&Locale::en)
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub config_path: PathBuf,
  pub file: ConfigFile,
  pub servers: Vec<ServerConfig>,
  pub output: PathBuf,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub async fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      config,
      servers,
      output,
      verbose,
      quiet,
    } = command;

    let file = ConfigFile::load(&config).await?;
    let selected = file.select_servers(&servers)?.into_iter().cloned().collect();
    let output = output.unwrap_or_else(|| file.output.clone());

    Ok(Self {
      config_path: config,
      file,
      servers: selected,
      output,
      verbose,
      quiet,
    })
  }

  /// Hooks read `api.ts` from disk when the wrapper step is switched off.
  fn reads_existing_api(&self) -> bool {
    let features = &self.file.features;
    !features.is_enabled(Feature::DomainApi) && features.is_enabled(Feature::Hooks)
  }

  /// The schema module is only imported by type modules.
  fn needs_schema_copy(&self) -> bool {
    let features = &self.file.features;
    features.is_enabled(Feature::ValidatedTypes) || features.is_enabled(Feature::PropertyTypes)
  }
}

/// Loads every `{output}/{server}/{tag}/api.ts` already on disk.
async fn seed_api_modules(output: &Path, server: &str) -> anyhow::Result<ArtifactSet> {
  let mut seed = ArtifactSet::default();
  let server_dir = output.join(server);
  if !tokio::fs::try_exists(&server_dir).await.unwrap_or(false) {
    return Ok(seed);
  }

  let mut entries = tokio::fs::read_dir(&server_dir)
    .await
    .with_context(|| format!("cannot read {}", server_dir.display()))?;
  while let Some(entry) = entries.next_entry().await? {
    if !entry.file_type().await?.is_dir() {
      continue;
    }
    let api = entry.path().join(ArtifactKind::DomainApi.file_name());
    let Ok(content) = tokio::fs::read_to_string(&api).await else {
      continue;
    };
    let tag = entry.file_name().to_string_lossy().into_owned();
    seed.insert(GeneratedArtifact::for_tag(server, &tag, ArtifactKind::DomainApi, content));
  }
  Ok(seed)
}

/// Writes each artifact of `artifacts` that is not already in `seed` unchanged.
async fn write_artifacts(output: &Path, artifacts: &ArtifactSet, seed: &ArtifactSet) -> anyhow::Result<usize> {
  let mut written = 0;
  for artifact in artifacts.iter() {
    if seed.get(&artifact.server, artifact.tag.as_deref(), artifact.kind) == Some(artifact) {
      continue;
    }
    let path = output.join(artifact.relative_path());
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &artifact.content)
      .await
      .with_context(|| format!("cannot write {}", path.display()))?;
    written += 1;
  }
  Ok(written)
}

async fn copy_schema(input: &Path, output: &Path, server: &str) -> anyhow::Result<()> {
  let target = output.join(server).join(SCHEMA_FILE);
  if let Some(parent) = target.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::copy(input, &target)
    .await
    .with_context(|| format!("cannot copy {} to {}", input.display(), target.display()))?;
  Ok(())
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.role(Role::Timestamp)));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.role(Role::Label)),
        value.with(self.colors.role(Role::Value))
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading config from: {}", self.config.config_path.display())
        .with(self.colors.role(Role::Progress))
        .to_string(),
    );
  }

  fn log_server(&self, server: &ServerConfig) {
    self.info(
      &format!("Generating '{}' from: {}", server.name, server.input.display())
        .with(self.colors.role(Role::Progress))
        .to_string(),
    );
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat(
      "Paths:",
      format!(
        "{} discovered, {} excluded",
        count(stats.paths_discovered),
        count(stats.paths_excluded)
      ),
    );
    self.stat("Schemas:", count(stats.schemas_discovered));
    self.stat("Operations:", count(stats.operations_extracted));
    self.stat("Tags:", count(stats.tags_classified));
    self.stat("Aliases generated:", count(stats.aliases_generated()));
    self.stat(
      "",
      format!(
        "{} params, {} body, {} response, {} RO",
        count(stats.params_aliases),
        count(stats.body_aliases),
        count(stats.response_aliases),
        count(stats.ro_aliases)
      ),
    );
    self.stat("", format!("{} property aliases", count(stats.property_aliases)));
    self.stat("Endpoints:", count(stats.endpoints_generated));
    self.stat("Wrappers:", count(stats.wrappers_generated));
    self.stat(
      "Hooks:",
      format!(
        "{} queries, {} mutations",
        count(stats.query_hooks_generated),
        count(stats.mutation_hooks_generated)
      ),
    );
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", count(stats.warnings.len()));
    }
    self.print_warnings(stats);
  }

  fn print_summary(&self, summary: &RunSummary) {
    if let Some(aborted) = &summary.aborted {
      eprintln!(
        "{} {}",
        format!("Aborted at '{}':", aborted.step).with(self.colors.role(Role::Failure)),
        aborted.error.as_str().with(self.colors.role(Role::Value))
      );
      return;
    }
    if self.config.quiet {
      return;
    }

    self.stat("Steps succeeded:", count(summary.successes.len()));
    if summary.is_clean() {
      self.stat("Steps failed:", "none".to_string());
    }
    if !summary.skipped.is_empty() {
      let skipped: Vec<String> = summary.skipped.iter().map(ToString::to_string).collect();
      self.stat("Steps disabled:", skipped.join(", "));
    }
    for failure in &summary.failures {
      eprintln!(
        "{} {}",
        format!("Failed '{}':", failure.step).with(self.colors.role(Role::Failure)),
        failure.error.as_str().with(self.colors.role(Role::Value))
      );
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    if stats.warnings.is_empty() || self.config.quiet {
      return;
    }

    let mut printed_header = false;
    for warning in &stats.warnings {
      let should_print = warning.is_skipped_item() || self.config.verbose;
      if !should_print {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }

      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.warning(warning)),
        format!("{warning}").with(self.colors.role(Role::Value))
      );
    }
  }

  fn log_writing(&self, written: usize) {
    self.info(
      &format!("Wrote {} files to: {}", count(written), self.config.output.display())
        .with(self.colors.role(Role::Progress))
        .to_string(),
    );
  }

  fn log_success(&self, servers: usize) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.role(Role::Timestamp)),
        format!("Successfully generated {} server(s)", count(servers)).with(self.colors.role(Role::Success))
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);
  logger.log_loading();

  let orchestrator = Orchestrator::new(config.file.codegen_config());
  let mut aborted = vec![];

  for server in &config.servers {
    logger.log_server(server);

    let seed = if config.reads_existing_api() {
      seed_api_modules(&config.output, &server.name).await?
    } else {
      ArtifactSet::default()
    };
    let outcome = orchestrator.run(&server.to_input(), seed.clone()).await;

    logger.print_statistics(&outcome.stats);
    logger.print_summary(&outcome.summary);
    if outcome.summary.is_aborted() {
      aborted.push(server.name.clone());
      continue;
    }

    let written = write_artifacts(&config.output, &outcome.artifacts, &seed).await?;
    if config.needs_schema_copy() {
      copy_schema(&server.input, &config.output, &server.name).await?;
    }
    logger.log_writing(written);
  }

  if !aborted.is_empty() {
    anyhow::bail!("Generation aborted for: {}", aborted.join(", "));
  }

  logger.log_success(config.servers.len());
  Ok(())
}
