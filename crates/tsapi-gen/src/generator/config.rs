//! Options that shape generated code. Everything here has a default, so an
//! empty configuration reproduces the stock output.

use std::{
  collections::{BTreeMap, HashMap},
  sync::LazyLock,
};

use http::Method;
use regex::Regex;
use serde::Deserialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::generator::schema_walker::DEFAULT_MAX_SCHEMA_DEPTH;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([A-Za-z]*)\}").expect("invalid regex"));

/// Optional pipeline steps that can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Deserialize)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Feature {
  TagList,
  ValidatedTypes,
  PropertyTypes,
  Endpoints,
  DomainApi,
  Hooks,
}

/// One feature entry as written in a config file: `true` or `{ "enabled": true }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FeatureSetting {
  Flag(bool),
  Detailed { enabled: bool },
}

impl FeatureSetting {
  pub const fn enabled(self) -> bool {
    match self {
      Self::Flag(enabled) | Self::Detailed { enabled } => enabled,
    }
  }
}

/// Normalized feature switches. Features not mentioned are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<Feature, FeatureSetting>")]
pub struct FeatureFlags(BTreeMap<Feature, bool>);

impl Default for FeatureFlags {
  fn default() -> Self {
    Self(Feature::iter().map(|feature| (feature, true)).collect())
  }
}

impl From<BTreeMap<Feature, FeatureSetting>> for FeatureFlags {
  fn from(settings: BTreeMap<Feature, FeatureSetting>) -> Self {
    let mut flags = Self::default();
    for (feature, setting) in settings {
      flags.0.insert(feature, setting.enabled());
    }
    flags
  }
}

impl FeatureFlags {
  pub fn is_enabled(&self, feature: Feature) -> bool {
    self.0.get(&feature).copied().unwrap_or(true)
  }
}

const DEFAULT_VERB_PREFIXES: [(&str, &str); 5] = [
  ("get", "fetch"),
  ("post", "create"),
  ("put", "update"),
  ("patch", "modify"),
  ("delete", "remove"),
];

/// Wrapper name prefix per HTTP method. Entries from a config file are merged
/// over the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct VerbPrefixes(BTreeMap<String, String>);

impl Default for VerbPrefixes {
  fn default() -> Self {
    Self(
      DEFAULT_VERB_PREFIXES
        .iter()
        .map(|(method, prefix)| ((*method).to_string(), (*prefix).to_string()))
        .collect(),
    )
  }
}

impl From<HashMap<String, String>> for VerbPrefixes {
  fn from(overrides: HashMap<String, String>) -> Self {
    let mut prefixes = Self::default();
    for (method, prefix) in overrides {
      prefixes.0.insert(method.to_ascii_lowercase(), prefix);
    }
    prefixes
  }
}

impl VerbPrefixes {
  /// The prefix for `method`, or the lowercase method name when none is configured.
  pub fn prefix_for(&self, method: &Method) -> String {
    let key = method.as_str().to_ascii_lowercase();
    self.0.get(&key).cloned().unwrap_or(key)
  }

  /// The method whose prefix starts `wrapper_name`, preferring the longest prefix.
  pub fn method_for_name(&self, wrapper_name: &str) -> Option<Method> {
    self
      .0
      .iter()
      .filter(|(_, prefix)| {
        wrapper_name
          .strip_prefix(prefix.as_str())
          .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
      })
      .max_by_key(|(_, prefix)| prefix.len())
      .and_then(|(method, _)| Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok())
  }

  pub fn prefixes(&self) -> impl Iterator<Item = &str> {
    self.0.values().map(String::as_str)
  }
}

/// Values substituted into doc templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocContext<'a> {
  pub method: &'a Method,
  pub path: &'a str,
  pub operation_id: &'a str,
  pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TemplateError {
  #[strum(to_string = "Unknown placeholder '{placeholder}' in {template} template")]
  UnknownPlaceholder { template: &'static str, placeholder: String },
}

impl std::error::Error for TemplateError {}

const TEMPLATE_PLACEHOLDERS: [&str; 4] = ["method", "path", "operationId", "name"];

/// JSDoc templates. Each line of a rendered template becomes one doc line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocTemplates {
  pub wrapper: String,
  pub query_hook: String,
  pub mutation_hook: String,
}

impl Default for DocTemplates {
  fn default() -> Self {
    Self {
      wrapper: "{method} {path}".to_string(),
      query_hook: "Query hook for `{name}` ({method} {path}).".to_string(),
      mutation_hook: "Mutation hook for `{name}` ({method} {path}).".to_string(),
    }
  }
}

impl DocTemplates {
  /// Checks every template for placeholders that cannot be filled.
  pub fn validate(&self) -> Result<(), TemplateError> {
    for (template, text) in [
      ("wrapper", &self.wrapper),
      ("queryHook", &self.query_hook),
      ("mutationHook", &self.mutation_hook),
    ] {
      for caps in PLACEHOLDER_RE.captures_iter(text) {
        let placeholder = &caps[1];
        if !TEMPLATE_PLACEHOLDERS.contains(&placeholder) {
          return Err(TemplateError::UnknownPlaceholder {
            template,
            placeholder: caps[0].to_string(),
          });
        }
      }
    }
    Ok(())
  }

  pub fn render(template: &str, context: &DocContext<'_>) -> Vec<String> {
    let method = context.method.as_str();
    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &regex::Captures<'_>| match &caps[1] {
      "method" => method.to_string(),
      "path" => context.path.to_string(),
      "operationId" => context.operation_id.to_string(),
      "name" => context.name.to_string(),
      _ => caps[0].to_string(),
    });
    rendered
      .lines()
      .map(|line| line.trim_end().replace("*/", "*\\/"))
      .filter(|line| !line.is_empty())
      .collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorNotification {
  None,
  #[default]
  Console,
  Toast,
}

/// How mutation hooks report outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationPolicy {
  pub on_error: ErrorNotification,
  pub on_success: bool,
  pub success_message: String,
}

impl Default for NotificationPolicy {
  fn default() -> Self {
    Self {
      on_error: ErrorNotification::Console,
      on_success: false,
      success_message: "Request completed".to_string(),
    }
  }
}

impl NotificationPolicy {
  pub fn uses_notifier(&self) -> bool {
    self.on_success || self.on_error == ErrorNotification::Toast
  }
}

/// Module specifiers written into generated imports.
///
/// `schema` may contain `{server}` and `{tag}`, which are replaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportPaths {
  pub schema: String,
  pub runtime: String,
  pub query: String,
  pub notifier: String,
}

impl Default for ImportPaths {
  fn default() -> Self {
    Self {
      schema: "../schema".to_string(),
      runtime: "@/api/runtime".to_string(),
      query: "@tanstack/react-query".to_string(),
      notifier: "@/lib/notify".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct CodegenConfig {
  #[builder(default)]
  pub verb_prefixes: VerbPrefixes,
  #[builder(default)]
  pub features: FeatureFlags,
  #[builder(default)]
  pub doc_templates: DocTemplates,
  #[builder(default)]
  pub notifications: NotificationPolicy,
  #[builder(default)]
  pub imports: ImportPaths,
  #[builder(default = DEFAULT_MAX_SCHEMA_DEPTH)]
  pub max_schema_depth: usize,
}

impl Default for CodegenConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}
