//! The JSON configuration file read by `generate`.

use std::{
  collections::BTreeSet,
  path::{Path, PathBuf},
};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;
use strum::Display;

use crate::generator::{
  config::{CodegenConfig, DocTemplates, FeatureFlags, ImportPaths, NotificationPolicy, VerbPrefixes},
  orchestrator::{DescriptionSource, ServerInput},
  schema_walker::DEFAULT_MAX_SCHEMA_DEPTH,
};

pub const DEFAULT_CONFIG_FILE: &str = "tsapi-gen.json";
const DEFAULT_OUTPUT_DIR: &str = "src/api/generated";

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ConfigError {
  #[strum(to_string = "No servers configured")]
  NoServers,
  #[strum(to_string = "Server #{index} has an empty name")]
  EmptyServerName { index: usize },
  #[strum(to_string = "Server '{name}' is configured more than once")]
  DuplicateServer { name: String },
  #[strum(to_string = "Unknown server '{name}', expected one of: {known}")]
  UnknownServer { name: String, known: String },
  #[strum(to_string = "maxSchemaDepth must be at least 1")]
  ZeroSchemaDepth,
}

impl std::error::Error for ConfigError {}

/// One interface description to generate from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
  pub name: String,
  pub input: PathBuf,
  #[serde(default)]
  pub exclude_tag: Option<String>,
}

impl ServerConfig {
  pub fn to_input(&self) -> ServerInput {
    ServerInput {
      name: self.name.clone(),
      exclude_tag: self.exclude_tag.clone(),
      source: DescriptionSource::File(self.input.clone()),
    }
  }
}

fn default_output() -> PathBuf {
  PathBuf::from(DEFAULT_OUTPUT_DIR)
}

const fn default_max_schema_depth() -> usize {
  DEFAULT_MAX_SCHEMA_DEPTH
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
  #[serde(default = "default_output")]
  pub output: PathBuf,
  #[serde(default)]
  pub servers: Vec<ServerConfig>,
  #[serde(default)]
  pub verb_prefixes: VerbPrefixes,
  #[serde(default)]
  pub features: FeatureFlags,
  #[serde(default)]
  pub doc_templates: DocTemplates,
  #[serde(default)]
  pub notifications: NotificationPolicy,
  #[serde(default)]
  pub imports: ImportPaths,
  #[serde(default = "default_max_schema_depth")]
  pub max_schema_depth: usize,
}

impl ConfigFile {
  /// Parses a config document. Errors name the JSON path of the offending value.
  pub fn from_json(text: &str) -> anyhow::Result<Self> {
    let deserializer = &mut serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(deserializer)
      .map_err(|error| anyhow::anyhow!("Invalid config at '{}': {}", error.path(), error.inner()))
  }

  /// Reads, validates and resolves a config file. Relative server inputs are
  /// taken relative to the directory of the file.
  pub async fn load(path: &Path) -> anyhow::Result<Self> {
    let text = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("cannot read config file {}", path.display()))?;
    let mut config = Self::from_json(&text).with_context(|| format!("in {}", path.display()))?;
    config.resolve_inputs(path.parent().unwrap_or_else(|| Path::new("")));
    config.validate()?;
    Ok(config)
  }

  pub fn resolve_inputs(&mut self, base: &Path) {
    for server in &mut self.servers {
      if server.input.is_relative() {
        server.input = base.join(&server.input);
      }
    }
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.servers.is_empty() {
      return Err(ConfigError::NoServers.into());
    }
    if self.max_schema_depth == 0 {
      return Err(ConfigError::ZeroSchemaDepth.into());
    }

    let mut names = BTreeSet::new();
    for (index, server) in self.servers.iter().enumerate() {
      if server.name.trim().is_empty() {
        return Err(ConfigError::EmptyServerName { index }.into());
      }
      if !names.insert(server.name.as_str()) {
        return Err(
          ConfigError::DuplicateServer {
            name: server.name.clone(),
          }
          .into(),
        );
      }
    }

    self.doc_templates.validate()?;
    Ok(())
  }

  /// Servers named in `only`, or every server when `only` is empty.
  pub fn select_servers(&self, only: &[String]) -> anyhow::Result<Vec<&ServerConfig>> {
    if only.is_empty() {
      return Ok(self.servers.iter().collect());
    }
    only
      .iter()
      .map(|name| {
        self.servers.iter().find(|server| server.name == *name).ok_or_else(|| {
          anyhow::Error::from(ConfigError::UnknownServer {
            name: name.clone(),
            known: self.servers.iter().map(|server| server.name.as_str()).join(", "),
          })
        })
      })
      .collect()
  }

  pub fn codegen_config(&self) -> CodegenConfig {
    CodegenConfig::builder()
      .verb_prefixes(self.verb_prefixes.clone())
      .features(self.features.clone())
      .doc_templates(self.doc_templates.clone())
      .notifications(self.notifications.clone())
      .imports(self.imports.clone())
      .max_schema_depth(self.max_schema_depth)
      .build()
  }
}
