//! Derives the validated type aliases of each operation.
//!
//! Every operation yields up to four aliases: `{id}_Params`, `{id}_Body`,
//! `{id}_Response` and `{id}_RO`. The Response is picked by an ordered list of
//! strategies (see [`ResponseStrategy`]); the RO is the schema referenced by the
//! `data` field of the Response shape that won, whether that shape is named or inline.

pub(crate) mod responses;

use std::{collections::HashMap, sync::LazyLock};

use anyhow::bail;
use http::Method;
use regex::Regex;

pub use self::responses::{ResponseStrategy, resolve_response};
use crate::{
  generator::{
    ast::{GeneratedType, OperationRef, ParameterInfo, PathEntry, SchemaRef, TypeKind, TypeTarget},
    description::{
      InterfaceDescription,
      members::Member,
      refs::{array_schema_ref, direct_schema_ref},
    },
    metrics::GenerationWarning,
    scanner::strip_comments,
  },
  naming::identifiers::property_key,
};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex"));

/// Prefix of the comment line that opens a controller group.
pub(crate) const GROUP_HEADER_PREFIX: &str = "// ==== ";
const GROUP_HEADER_SUFFIX: &str = " ====";
const ROOT_GROUP: &str = "root";

/// Extracts every path and checks that operation ids are unique.
pub fn extract_model(
  description: &InterfaceDescription,
  warnings: &mut Vec<GenerationWarning>,
) -> anyhow::Result<Vec<PathEntry>> {
  let paths = description.extract_all_paths(warnings);

  let mut seen: HashMap<&str, (&Method, &str)> = HashMap::new();
  for entry in &paths {
    for (method, operation) in &entry.operations {
      if let Some((first_method, first_path)) = seen.insert(&operation.operation_id, (method, &entry.path)) {
        bail!(
          "duplicate operationId '{}' on {first_method} {first_path} and {method} {}",
          operation.operation_id,
          entry.path
        );
      }
    }
  }

  Ok(paths)
}

/// Type text on a single line with comments removed.
pub(crate) fn collapse_type_text(text: &str) -> String {
  WHITESPACE_RE.replace_all(strip_comments(text).trim(), " ").into_owned()
}

/// Renders members as a one-line object type, e.g. `{ id: number; page?: number }`.
pub(crate) fn render_object_type(fields: &[Member<'_>]) -> String {
  render_fields(
    fields
      .iter()
      .map(|field| (field.name.as_str(), field.optional, field.value)),
  )
}

pub(crate) fn render_fields<'a>(fields: impl IntoIterator<Item = (&'a str, bool, &'a str)>) -> String {
  let rendered: Vec<String> = fields
    .into_iter()
    .map(|(name, optional, value)| {
      let marker = if optional { "?" } else { "" };
      format!("{}{marker}: {}", property_key(name), collapse_type_text(value))
    })
    .collect();

  if rendered.is_empty() {
    "{}".to_string()
  } else {
    format!("{{ {} }}", rendered.join("; "))
  }
}

/// The RO a `data` field contributes: the schema it references, or an array of one.
/// Any other `data` type leaves the Response without an RO.
pub(crate) fn data_target(type_text: &str) -> Option<TypeTarget> {
  direct_schema_ref(type_text)
    .map(|name| TypeTarget::Schema(name.to_string()))
    .or_else(|| array_schema_ref(type_text).map(|name| TypeTarget::SchemaArray(name.to_string())))
}

/// The validated aliases derived for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTypes {
  pub operation_id: String,
  pub method: Method,
  pub path: String,
  pub parameters: Vec<ParameterInfo>,
  pub params: Option<GeneratedType>,
  pub body: Option<GeneratedType>,
  pub response: GeneratedType,
  pub ro: Option<GeneratedType>,
  pub strategy: Option<ResponseStrategy>,
}

impl OperationTypes {
  pub fn aliases(&self) -> impl Iterator<Item = &GeneratedType> {
    self
      .params
      .iter()
      .chain(self.body.iter())
      .chain(std::iter::once(&self.response))
      .chain(self.ro.iter())
  }

  /// Schemas the property walker starts from: the Body, Response and RO targets.
  pub fn root_schemas(&self) -> Vec<&str> {
    let mut roots = vec![];
    for generated in self.body.iter().chain(std::iter::once(&self.response)).chain(self.ro.iter()) {
      if let Some(name) = generated.target.referenced_schema()
        && !roots.contains(&name)
      {
        roots.push(name);
      }
    }
    roots
  }

  /// The type a wrapper resolves to: RO when present, `void` for empty responses,
  /// the Response alias otherwise.
  pub fn result_type(&self) -> String {
    match (&self.ro, &self.response.target) {
      (Some(ro), _) => ro.name.clone(),
      (None, TypeTarget::Void) => "void".to_string(),
      (None, _) => self.response.name.clone(),
    }
  }

  pub fn params_type(&self) -> Option<&str> {
    self.params.as_ref().map(|generated| generated.name.as_str())
  }

  pub fn body_type(&self) -> Option<&str> {
    self.body.as_ref().map(|generated| generated.name.as_str())
  }
}

/// Derives [`OperationTypes`] against one interface description.
#[derive(Debug, Clone, Copy)]
pub struct TypeExtractor<'a> {
  description: &'a InterfaceDescription,
}

impl<'a> TypeExtractor<'a> {
  pub fn new(description: &'a InterfaceDescription) -> Self {
    Self { description }
  }

  pub fn derive(&self, operation: &OperationRef, warnings: &mut Vec<GenerationWarning>) -> OperationTypes {
    let id = &operation.operation_id;
    let generated = |kind: TypeKind, target: TypeTarget| GeneratedType {
      name: kind.alias_name(id),
      kind,
      target,
    };

    let params = operation.has_parameters().then(|| {
      let fields = operation
        .parameters
        .iter()
        .map(|param| (param.name.as_str(), param.optional, param.type_text.as_str()));
      generated(TypeKind::Params, TypeTarget::Inline(render_fields(fields)))
    });

    let body = operation
      .request_body
      .as_ref()
      .map(|request_body| generated(TypeKind::Body, body_target(request_body)));

    let resolved = resolve_response(&operation.responses, self.description);
    let (response_target, ro_target, strategy) = match resolved {
      Some(resolved) => (resolved.response, resolved.ro, Some(resolved.strategy)),
      None => {
        warnings.push(GenerationWarning::unresolvable(
          id,
          "no usable 2xx or default response, falling back to unknown",
        ));
        (TypeTarget::Fallback, None, None)
      }
    };

    OperationTypes {
      operation_id: id.clone(),
      method: operation.method.clone(),
      path: operation.path.clone(),
      parameters: operation.parameters.clone(),
      params,
      body,
      response: generated(TypeKind::Response, response_target),
      ro: ro_target.map(|target| generated(TypeKind::Ro, target)),
      strategy,
    }
  }
}

fn body_target(request_body: &SchemaRef) -> TypeTarget {
  match request_body {
    SchemaRef::Named(name) => TypeTarget::Schema(name.clone()),
    SchemaRef::Inline(text) => match array_schema_ref(text) {
      Some(name) => TypeTarget::SchemaArray(name.to_string()),
      None => TypeTarget::Inline(collapse_type_text(text)),
    },
  }
}

/// The controller group of a path: its first two literal segments.
pub fn controller_group(path: &str) -> String {
  let literal: Vec<&str> = path
    .split('/')
    .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
    .take(2)
    .collect();

  if literal.is_empty() {
    ROOT_GROUP.to_string()
  } else {
    literal.join("/")
  }
}

pub fn group_header(group: &str) -> String {
  format!("{GROUP_HEADER_PREFIX}{group}{GROUP_HEADER_SUFFIX}")
}

fn is_group_header(line: &str) -> bool {
  line.starts_with(GROUP_HEADER_PREFIX) && line.ends_with(GROUP_HEADER_SUFFIX)
}

/// Drops every group header identical to the header emitted before it, along
/// with the blank line that separated the two groups.
pub fn collapse_group_headers(text: &str) -> String {
  let mut last_header: Option<&str> = None;
  let mut lines: Vec<&str> = vec![];

  for line in text.lines() {
    if is_group_header(line) {
      if last_header == Some(line) {
        if lines.last().is_some_and(|previous| previous.trim().is_empty()) {
          lines.pop();
        }
        continue;
      }
      last_header = Some(line);
    }
    lines.push(line);
  }

  let mut collapsed = lines.join("\n");
  if text.ends_with('\n') {
    collapsed.push('\n');
  }
  collapsed
}
