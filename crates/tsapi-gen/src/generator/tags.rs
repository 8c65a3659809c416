//! Buckets paths into tags.
//!
//! A path's tag comes from its first segment, or `{version}_{segment}` when the
//! first segment is an API version such as `v1`. Paths whose relevant segment is
//! `internal` never reach generation.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::LazyLock,
};

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::generator::ast::{PathEntry, TagEntry};

static VERSION_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v\d+$").expect("invalid regex"));

pub(crate) const ROOT_TAG: &str = "root";
const INTERNAL_SEGMENT: &str = "internal";

fn strip_braces(segment: &str) -> String {
  segment.chars().filter(|c| !matches!(c, '{' | '}')).collect()
}

/// The tag of a path, or `None` when the path is internal.
#[must_use]
pub fn tag_for_path(path: &str) -> Option<String> {
  let segments: Vec<String> = path
    .split('/')
    .filter(|segment| !segment.is_empty())
    .map(strip_braces)
    .filter(|segment| !segment.is_empty())
    .collect();

  let Some(first) = segments.first() else {
    return Some(ROOT_TAG.to_string());
  };

  match segments.get(1) {
    Some(second) if VERSION_SEGMENT_RE.is_match(first) => {
      (second != INTERNAL_SEGMENT).then(|| format!("{first}_{second}"))
    }
    _ => (first != INTERNAL_SEGMENT).then(|| first.clone()),
  }
}

/// The result of classifying every path of one server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagClassification {
  /// Tags by name, sorted.
  pub tags: BTreeMap<String, TagEntry>,
  /// Path to tag, in path order. Excluded paths are absent.
  pub assignments: IndexMap<String, String>,
  pub excluded: Vec<String>,
}

impl TagClassification {
  pub fn tag_names(&self) -> impl Iterator<Item = &str> {
    self.tags.keys().map(String::as_str)
  }

  pub fn tag_of(&self, path: &str) -> Option<&str> {
    self.assignments.get(path).map(String::as_str)
  }

  /// Entries of `paths` assigned to `tag`, in their original order.
  pub fn entries_for<'a>(&'a self, tag: &'a str, paths: &'a [PathEntry]) -> impl Iterator<Item = &'a PathEntry> {
    paths.iter().filter(move |entry| self.tag_of(&entry.path) == Some(tag))
  }

  pub fn summary(&self, server: &str) -> TagSummary {
    TagSummary {
      server: server.to_string(),
      total_paths: self.assignments.len(),
      tags: self.tags.keys().cloned().collect(),
      counts: self
        .tags
        .values()
        .map(|entry| (entry.name.clone(), entry.path_count))
        .collect(),
      paths: self
        .tags
        .values()
        .map(|entry| (entry.name.clone(), entry.paths.clone()))
        .collect(),
      excluded: self.excluded.clone(),
    }
  }
}

/// The document written as `tags.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
  pub server: String,
  pub total_paths: usize,
  pub tags: Vec<String>,
  pub counts: BTreeMap<String, usize>,
  pub paths: BTreeMap<String, Vec<String>>,
  pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagClassifier {
  excluded_tag: Option<String>,
}

impl TagClassifier {
  pub fn new(excluded_tag: Option<String>) -> Self {
    Self { excluded_tag }
  }

  pub fn classify<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> TagClassification {
    let mut result = TagClassification::default();
    let mut seen = BTreeSet::new();

    for path in paths {
      if !seen.insert(path) {
        continue;
      }
      let tag = tag_for_path(path).filter(|tag| self.excluded_tag.as_deref() != Some(tag.as_str()));
      let Some(tag) = tag else {
        result.excluded.push(path.to_string());
        continue;
      };

      let entry = result.tags.entry(tag.clone()).or_insert_with(|| TagEntry {
        name: tag.clone(),
        path_count: 0,
        paths: vec![],
      });
      entry.path_count += 1;
      entry.paths.push(path.to_string());
      result.assignments.insert(path.to_string(), tag);
    }

    result
  }

  pub fn classify_entries(&self, entries: &[PathEntry]) -> TagClassification {
    self.classify(entries.iter().map(|entry| entry.path.as_str()))
  }
}
