//! Text generators for every artifact kind.
//!
//! Each generator is a pure function of the extracted model plus naming and
//! import policy. The orchestrator decides which ones run and collects their
//! output in an [`ArtifactSet`].

pub mod api;
pub mod endpoints;
pub mod hooks;
pub mod imports;
pub mod property_types;
pub mod tag_list;
pub mod validated_types;

use std::path::PathBuf;

use indexmap::IndexMap;
use strum::{Display, EnumIter};

pub use self::imports::{ImportResolver, RelativeImportResolver};

pub(crate) const GENERATED_HEADER: &str = "// Auto-generated by tsapi-gen. Do not edit.";
pub(crate) const EMPTY_MODULE: &str = "export {};";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ArtifactKind {
  TagList,
  ValidatedTypes,
  PropertyTypes,
  Endpoints,
  DomainApi,
  QueryHooks,
  MutationHooks,
}

impl ArtifactKind {
  /// Module name used in relative imports between sibling artifacts.
  pub const fn module_name(self) -> &'static str {
    match self {
      Self::TagList => "tags",
      Self::ValidatedTypes => "types",
      Self::PropertyTypes => "props",
      Self::Endpoints => "endpoints",
      Self::DomainApi => "api",
      Self::QueryHooks => "queries",
      Self::MutationHooks => "mutations",
    }
  }

  pub const fn extension(self) -> &'static str {
    match self {
      Self::TagList => "json",
      _ => "ts",
    }
  }

  pub fn file_name(self) -> String {
    format!("{}.{}", self.module_name(), self.extension())
  }

  /// Whether one artifact of this kind exists per server rather than per tag.
  pub const fn is_per_server(self) -> bool {
    matches!(self, Self::TagList)
  }
}

/// One generated file and the (server, tag, kind) it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
  pub server: String,
  pub tag: Option<String>,
  pub kind: ArtifactKind,
  pub content: String,
}

impl GeneratedArtifact {
  pub fn for_server(server: &str, kind: ArtifactKind, content: String) -> Self {
    Self {
      server: server.to_string(),
      tag: None,
      kind,
      content,
    }
  }

  pub fn for_tag(server: &str, tag: &str, kind: ArtifactKind, content: String) -> Self {
    Self {
      server: server.to_string(),
      tag: Some(tag.to_string()),
      kind,
      content,
    }
  }

  /// Location relative to the output root: `{server}/[{tag}/]{file}`.
  /// Per-server kinds always sit at the server root.
  pub fn relative_path(&self) -> PathBuf {
    let mut path = PathBuf::from(&self.server);
    if !self.kind.is_per_server()
      && let Some(tag) = &self.tag
    {
      path.push(tag);
    }
    path.push(self.kind.file_name());
    path
  }
}

type ArtifactKey = (String, Option<String>, ArtifactKind);

/// Artifacts produced so far, keyed by (server, tag, kind). Later inserts for
/// the same key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
  artifacts: IndexMap<ArtifactKey, GeneratedArtifact>,
}

impl ArtifactSet {
  pub fn insert(&mut self, artifact: GeneratedArtifact) {
    let key = (artifact.server.clone(), artifact.tag.clone(), artifact.kind);
    self.artifacts.insert(key, artifact);
  }

  pub fn get(&self, server: &str, tag: Option<&str>, kind: ArtifactKind) -> Option<&GeneratedArtifact> {
    self
      .artifacts
      .get(&(server.to_string(), tag.map(ToString::to_string), kind))
  }

  pub fn content(&self, server: &str, tag: Option<&str>, kind: ArtifactKind) -> Option<&str> {
    self.get(server, tag, kind).map(|artifact| artifact.content.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
    self.artifacts.values()
  }

  pub fn len(&self) -> usize {
    self.artifacts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.artifacts.is_empty()
  }
}

impl IntoIterator for ArtifactSet {
  type Item = GeneratedArtifact;
  type IntoIter = indexmap::map::IntoValues<ArtifactKey, GeneratedArtifact>;

  fn into_iter(self) -> Self::IntoIter {
    self.artifacts.into_values()
  }
}

/// Joins rendered sections into a module: header, then each non-empty block
/// separated by one blank line.
pub(crate) fn assemble_module<I, S>(sections: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out = String::from(GENERATED_HEADER);
  out.push('\n');
  for section in sections {
    let section = section.as_ref().trim_end();
    if section.is_empty() {
      continue;
    }
    out.push('\n');
    out.push_str(section);
    out.push('\n');
  }
  out
}

/// JSDoc block for `lines`, indented by `indent` spaces.
pub(crate) fn doc_comment(lines: &[String], indent: usize) -> String {
  let pad = " ".repeat(indent);
  let mut out = format!("{pad}/**\n");
  for line in lines {
    out.push_str(&format!("{pad} * {line}\n"));
  }
  out.push_str(&format!("{pad} */"));
  out
}

/// `import type { a, b } from 'module';` with sorted, unique names.
pub(crate) fn import_line<'a>(
  names: impl IntoIterator<Item = &'a str>,
  module: &str,
  type_only: bool,
) -> Option<String> {
  let names: std::collections::BTreeSet<&str> = names.into_iter().collect();
  if names.is_empty() {
    return None;
  }
  let keyword = if type_only { "import type" } else { "import" };
  Some(format!(
    "{keyword} {{ {} }} from '{module}';",
    names.into_iter().collect::<Vec<_>>().join(", ")
  ))
}

#[cfg(test)]
mod tests;
