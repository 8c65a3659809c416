//! Locates structural blocks inside an interface description without a full grammar.
//!
//! The description is the `.d.ts` module emitted by openapi-typescript. Three
//! declarations matter: `paths`, `components` (for `components.schemas`) and
//! `operations`. Each is isolated with the brace scanner and then split into
//! members on demand.

pub(crate) mod members;
pub(crate) mod operation;
pub(crate) mod refs;
pub(crate) mod schemas;

use std::{cell::OnceCell, collections::HashSet, ops::Range};

use http::Method;
use indexmap::IndexMap;
use regex::Regex;

use self::{
  members::{find_member, members},
  operation::parse_operation,
  refs::operation_ref,
};
use crate::{
  generator::{
    ast::{OperationRef, PathEntry, SchemaDefinition, parse_method},
    metrics::GenerationWarning,
    scanner::match_close,
  },
  naming::identifiers::generate_operation_id,
};

pub(crate) const PATHS_BLOCK: &str = "paths";
pub(crate) const SCHEMAS_BLOCK: &str = "components.schemas";
pub(crate) const OPERATIONS_BLOCK: &str = "operations";

/// Byte offset of `inner` within `outer`. `inner` must be a subslice of `outer`.
fn offset_in(outer: &str, inner: &str) -> usize {
  inner.as_ptr() as usize - outer.as_ptr() as usize
}

fn declaration_open_brace(text: &str, name: &str) -> Option<usize> {
  let pattern = format!(
    r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?(?:interface|type)\s+{}\b\s*=?\s*\{{",
    regex::escape(name)
  );
  let re = Regex::new(&pattern).ok()?;
  re.find(text).map(|m| m.end() - 1)
}

/// Finds a top-level declaration body, descending into members for dotted
/// names such as `components.schemas`. Returns the range between the braces.
pub(crate) fn extract_top_level_block(text: &str, name: &str) -> Result<Range<usize>, String> {
  let mut segments = name.split('.');
  let root = segments.next().unwrap_or_default();
  let open = declaration_open_brace(text, root).ok_or_else(|| format!("declaration '{root}' not found"))?;
  let close = match_close(text, open).map_err(|e| e.to_string())?;
  let mut range = open + 1..close;

  for segment in segments {
    let body = &text[range.clone()];
    let member = find_member(body, segment).ok_or_else(|| format!("member '{segment}' not found"))?;
    let block = member
      .block()
      .ok_or_else(|| format!("member '{segment}' is not an object literal"))?;
    let start = range.start + offset_in(body, block);
    range = start..start + block.len();
  }

  Ok(range)
}

/// A parsed interface description. Block boundaries are located once; every
/// other structure is derived from the text on request.
#[derive(Debug)]
pub struct InterfaceDescription {
  text: String,
  paths: Option<Range<usize>>,
  schemas: Option<Range<usize>>,
  operations: Option<Range<usize>>,
  path_index: OnceCell<IndexMap<String, Range<usize>>>,
  schema_index: OnceCell<IndexMap<String, Range<usize>>>,
}

impl InterfaceDescription {
  pub fn parse(text: impl Into<String>, warnings: &mut Vec<GenerationWarning>) -> Self {
    let text = text.into();
    let mut locate = |name: &str| match extract_top_level_block(&text, name) {
      Ok(range) => Some(range),
      Err(message) => {
        warnings.push(GenerationWarning::malformed(name, message));
        None
      }
    };

    let paths = locate(PATHS_BLOCK);
    let schemas = locate(SCHEMAS_BLOCK);
    let operations = locate(OPERATIONS_BLOCK);

    Self {
      text,
      paths,
      schemas,
      operations,
      path_index: OnceCell::new(),
      schema_index: OnceCell::new(),
    }
  }

  fn block(&self, range: Option<&Range<usize>>) -> &str {
    range.map_or("", |range| &self.text[range.clone()])
  }

  /// The body of one of the three structural blocks, or of any other
  /// declaration in the text.
  pub fn extract_top_level_block(&self, name: &str) -> Option<&str> {
    match name {
      PATHS_BLOCK => self.paths.as_ref().map(|range| &self.text[range.clone()]),
      SCHEMAS_BLOCK => self.schemas.as_ref().map(|range| &self.text[range.clone()]),
      OPERATIONS_BLOCK => self.operations.as_ref().map(|range| &self.text[range.clone()]),
      _ => extract_top_level_block(&self.text, name)
        .ok()
        .map(|range| &self.text[range]),
    }
  }

  pub fn paths_block(&self) -> &str {
    self.block(self.paths.as_ref())
  }

  pub fn schemas_block(&self) -> &str {
    self.block(self.schemas.as_ref())
  }

  pub fn operations_block(&self) -> &str {
    self.block(self.operations.as_ref())
  }

  /// Every path with all of its resolvable operations, in declaration order.
  /// Duplicate paths keep their first declaration.
  pub fn extract_all_paths(&self, warnings: &mut Vec<GenerationWarning>) -> Vec<PathEntry> {
    let mut seen = HashSet::new();
    let mut entries = vec![];

    for path_member in members(self.paths_block()) {
      if !seen.insert(path_member.name.clone()) {
        warnings.push(GenerationWarning::malformed(
          PATHS_BLOCK,
          format!("duplicate path '{}' ignored", path_member.name),
        ));
        continue;
      }
      let Some(path_body) = path_member.block() else {
        warnings.push(GenerationWarning::malformed(
          PATHS_BLOCK,
          format!("path '{}' is not an object literal", path_member.name),
        ));
        continue;
      };

      let mut operations = IndexMap::new();
      for method in members(path_body).iter().filter_map(|member| parse_method(&member.name)) {
        if operations.contains_key(&method) {
          continue;
        }
        if let Some(operation) = self.extract_operation(&path_member.name, &method, warnings) {
          operations.insert(method, operation);
        }
      }

      entries.push(PathEntry {
        path: path_member.name,
        operations,
      });
    }

    entries
  }

  /// Extracts the operation declared for `method` on `path`.
  pub fn extract_operation(
    &self,
    path: &str,
    method: &Method,
    warnings: &mut Vec<GenerationWarning>,
  ) -> Option<OperationRef> {
    let path_body = self.path_body(path)?;
    let method_member = members(path_body)
      .into_iter()
      .find(|member| parse_method(&member.name).as_ref() == Some(method))?;
    if method_member.is_placeholder() {
      return None;
    }
    self.resolve_operation(path, method, method_member.value, warnings)
  }

  fn resolve_operation(
    &self,
    path: &str,
    method: &Method,
    reference: &str,
    warnings: &mut Vec<GenerationWarning>,
  ) -> Option<OperationRef> {
    if let Some(operation_id) = operation_ref(reference) {
      let Some(body) = find_member(self.operations_block(), operation_id).and_then(|member| member.block()) else {
        warnings.push(GenerationWarning::malformed(
          OPERATIONS_BLOCK,
          format!("operation '{operation_id}' referenced by {method} {path} not found"),
        ));
        return None;
      };
      return Some(parse_operation(operation_id, method, path, body, false, warnings));
    }

    if let Some(body) = members::braced_body(reference) {
      let operation_id = generate_operation_id(method.as_str(), path);
      return Some(parse_operation(&operation_id, method, path, body, true, warnings));
    }

    warnings.push(GenerationWarning::malformed(
      PATHS_BLOCK,
      format!("{method} {path} does not reference an operation: {reference}"),
    ));
    None
  }

  /// Path declarations by name. A repeated path keeps its first declaration.
  fn path_index(&self) -> &IndexMap<String, Range<usize>> {
    self.path_index.get_or_init(|| {
      let block = self.paths_block();
      let base = self.paths.as_ref().map_or(0, |range| range.start);
      let mut index = IndexMap::new();
      for member in members(block) {
        let start = base + offset_in(block, member.value);
        index.entry(member.name).or_insert(start..start + member.value.len());
      }
      index
    })
  }

  fn path_body(&self, path: &str) -> Option<&str> {
    self
      .path_index()
      .get(path)
      .and_then(|range| members::braced_body(&self.text[range.clone()]))
  }

  fn schema_index(&self) -> &IndexMap<String, Range<usize>> {
    self.schema_index.get_or_init(|| {
      let block = self.schemas_block();
      let base = self.schemas.as_ref().map_or(0, |range| range.start);
      members(block)
        .into_iter()
        .map(|member| {
          let start = base + offset_in(block, member.value);
          (member.name, start..start + member.value.len())
        })
        .collect()
    })
  }

  pub fn schema_names(&self) -> impl Iterator<Item = &str> {
    self.schema_index().keys().map(String::as_str)
  }

  /// The raw type text declared for a schema.
  pub fn schema_type(&self, name: &str) -> Option<&str> {
    self.schema_index().get(name).map(|range| &self.text[range.clone()])
  }

  /// The object body of a schema, or `None` when the schema is missing or not
  /// an object literal.
  pub fn schema_body(&self, name: &str) -> Option<&str> {
    self.schema_type(name).and_then(members::braced_body)
  }

  pub fn schema(&self, name: &str) -> Option<SchemaDefinition> {
    self.schema_body(name).map(|body| SchemaDefinition::parse(name, body))
  }
}

#[cfg(test)]
mod tests;
