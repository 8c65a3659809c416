use std::{collections::BTreeSet, sync::LazyLock};

use http::Method;
use regex::Regex;

use super::{EMPTY_MODULE, assemble_module};
use crate::{
  generator::{ast::path_placeholders, extractor::OperationTypes},
  naming::identifiers::{ensure_unique, sanitize, to_constant_case, to_identifier},
};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("invalid regex"));

const PLACEHOLDER_TYPE: &str = "string | number";
const ROOT_SEGMENT: &str = "root";

/// The path constant (or path builder) of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDef {
  pub operation_id: String,
  pub method: Method,
  pub path: String,
  pub name: String,
  /// `(placeholder, argument identifier)` in path order.
  pub placeholders: Vec<(String, String)>,
}

impl EndpointDef {
  pub fn is_dynamic(&self) -> bool {
    !self.placeholders.is_empty()
  }

  /// The expression that yields the URL, given one argument per placeholder.
  pub fn call<S: AsRef<str>>(&self, args: &[S]) -> String {
    if self.is_dynamic() {
      let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
      format!("{}({})", self.name, args.join(", "))
    } else {
      self.name.clone()
    }
  }

  fn render(&self) -> String {
    if !self.is_dynamic() {
      return format!("export const {} = '{}';", self.name, self.path.replace('\'', "\\'"));
    }

    let params: Vec<String> = self
      .placeholders
      .iter()
      .map(|(_, ident)| format!("{ident}: {PLACEHOLDER_TYPE}"))
      .collect();

    let mut template = String::new();
    let mut last = 0;
    for (caps, (_, ident)) in PLACEHOLDER_RE.captures_iter(&self.path).zip(&self.placeholders) {
      let Some(whole) = caps.get(0) else {
        continue;
      };
      template.push_str(&escape_template(&self.path[last..whole.start()]));
      template.push_str(&format!("${{{ident}}}"));
      last = whole.end();
    }
    template.push_str(&escape_template(&self.path[last..]));

    format!("export const {} = ({}) => `{template}`;", self.name, params.join(", "))
  }
}

fn escape_template(literal: &str) -> String {
  literal.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

/// `{METHOD}_{PATH}` in constant case, e.g. `GET_USERS_ID` for `GET /users/{id}`.
pub fn endpoint_constant_name(method: &Method, path: &str) -> String {
  let segments: Vec<String> = path
    .split('/')
    .map(|segment| sanitize(&segment.replace(['{', '}'], "")))
    .filter(|segment| !segment.is_empty())
    .collect();
  let path_part = if segments.is_empty() {
    ROOT_SEGMENT.to_string()
  } else {
    segments.join("_")
  };
  to_constant_case(&format!("{}_{path_part}", method.as_str().to_ascii_lowercase()))
}

/// Endpoint definitions for the operations of one tag, with collision-free names.
pub fn plan_endpoints(operations: &[OperationTypes]) -> Vec<EndpointDef> {
  let mut used = BTreeSet::new();
  operations
    .iter()
    .map(|operation| {
      let name = ensure_unique(&endpoint_constant_name(&operation.method, &operation.path), &used);
      used.insert(name.clone());

      let mut idents = BTreeSet::new();
      let placeholders = path_placeholders(&operation.path)
        .into_iter()
        .map(|placeholder| {
          let ident = ensure_unique(&to_identifier(&placeholder), &idents);
          idents.insert(ident.clone());
          (placeholder, ident)
        })
        .collect();

      EndpointDef {
        operation_id: operation.operation_id.clone(),
        method: operation.method.clone(),
        path: operation.path.clone(),
        name,
        placeholders,
      }
    })
    .collect()
}

/// `endpoints.ts` for one tag.
pub fn generate_endpoints(endpoints: &[EndpointDef]) -> String {
  if endpoints.is_empty() {
    return assemble_module([EMPTY_MODULE]);
  }
  let lines: Vec<String> = endpoints.iter().map(EndpointDef::render).collect();
  assemble_module([lines.join("\n")])
}
