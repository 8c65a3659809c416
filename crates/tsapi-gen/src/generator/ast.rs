//! Structural model extracted from an interface description.

use std::sync::LazyLock;

use http::Method;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use strum::{Display, EnumIter};

/// HTTP methods in the order the interface description lists them.
pub(crate) const KNOWN_METHODS: [Method; 8] = [
  Method::GET,
  Method::PUT,
  Method::POST,
  Method::DELETE,
  Method::OPTIONS,
  Method::HEAD,
  Method::PATCH,
  Method::TRACE,
];

static PATH_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("invalid regex"));

/// Placeholder names of a path template, in order: `/a/{x}/{y}` gives `x`, `y`.
pub fn path_placeholders(path: &str) -> Vec<String> {
  PATH_PLACEHOLDER_RE
    .captures_iter(path)
    .map(|caps| caps[1].to_string())
    .collect()
}

#[must_use]
pub(crate) fn parse_method(name: &str) -> Option<Method> {
  KNOWN_METHODS
    .iter()
    .find(|method| method.as_str().eq_ignore_ascii_case(name))
    .cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterLocation {
  Path,
  Query,
  Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
  pub name: String,
  pub type_text: String,
  pub optional: bool,
  pub location: ParameterLocation,
}

/// A type slot that either names a component schema or carries raw type text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
  Named(String),
  Inline(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseContent {
  /// `components['schemas']['X']`
  Schema(String),
  /// An object literal, kept with its braces.
  Inline(String),
  /// `204` or `content?: never`.
  NoContent,
  /// Anything else, such as arrays, primitives or shared response references.
  Other(String),
}

/// One HTTP method on one path, with everything needed to type it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
  pub operation_id: String,
  pub method: Method,
  pub path: String,
  pub parameters: Vec<ParameterInfo>,
  pub request_body: Option<SchemaRef>,
  pub responses: IndexMap<String, ResponseContent>,
  /// The id was derived from method and path because the operation was inline.
  pub synthesized_id: bool,
}

impl OperationRef {
  pub fn has_parameters(&self) -> bool {
    !self.parameters.is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
  pub path: String,
  pub operations: IndexMap<Method, OperationRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PropertyPriority {
  #[default]
  Baseline,
  NestedReference,
  SuffixMatch,
  EnumOrUnion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
  pub name: String,
  pub type_text: String,
  pub optional: bool,
  pub is_array: bool,
  pub enum_values: Option<Vec<String>>,
  pub nested_schema: Option<String>,
  pub priority: PropertyPriority,
}

impl PropertyInfo {
  pub fn is_enum(&self) -> bool {
    self.enum_values.is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
  pub name: String,
  pub body: String,
  pub properties: Vec<PropertyInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEntry {
  pub name: String,
  pub path_count: usize,
  pub paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TypeKind {
  Params,
  Body,
  Response,
  #[strum(to_string = "RO")]
  Ro,
  Property,
}

impl TypeKind {
  pub fn alias_name(self, operation_id: &str) -> String {
    format!("{operation_id}_{self}")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTarget {
  /// A component schema, rendered through its local alias.
  Schema(String),
  /// A schema used as an array element.
  SchemaArray(String),
  Inline(String),
  Void,
  /// Permissive placeholder for types that could not be resolved.
  Fallback,
}

impl TypeTarget {
  pub fn referenced_schema(&self) -> Option<&str> {
    match self {
      Self::Schema(name) | Self::SchemaArray(name) => Some(name),
      Self::Inline(_) | Self::Void | Self::Fallback => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedType {
  pub name: String,
  pub kind: TypeKind,
  pub target: TypeTarget,
}
