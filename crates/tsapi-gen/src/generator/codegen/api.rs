//! Domain API wrappers: one async function per operation that builds its URL
//! with the endpoint helpers and sends the request through the runtime `http`
//! client, unwrapping the result with `handleResponse`.

use std::collections::BTreeSet;

use anyhow::Context;
use http::Method;
use itertools::Itertools;

use super::{
  ArtifactKind, EMPTY_MODULE, ImportResolver, assemble_module, doc_comment, endpoints::EndpointDef, import_line,
};
use crate::{
  generator::{
    ast::ParameterLocation,
    config::{CodegenConfig, DocContext, DocTemplates, VerbPrefixes},
    extractor::OperationTypes,
  },
  naming::identifiers::{ensure_unique, property_key, to_identifier, to_pascal_case},
};

const ROOT_NAME: &str = "Root";
const RUNTIME_NAMES: [&str; 2] = ["handleResponse", "http"];
/// Names a wrapper body binds or reads, which path and header arguments must avoid.
const RESERVED_BINDINGS: [&str; 6] = ["params", "body", "query", "headers", "http", "handleResponse"];
/// Methods whose `http` call takes the body as its second argument.
const BODY_METHODS: [Method; 3] = [Method::POST, Method::PUT, Method::PATCH];

/// One generated wrapper function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperDef {
  pub name: String,
  pub operation_id: String,
  pub method: Method,
  pub path: String,
  pub params_type: Option<String>,
  pub body_type: Option<String>,
  pub result_type: String,
}

impl WrapperDef {
  fn signature(&self) -> String {
    let mut args = vec![];
    if let Some(params) = &self.params_type {
      args.push(format!("params: {params}"));
    }
    if let Some(body) = &self.body_type {
      args.push(format!("body: {body}"));
    }
    args.join(", ")
  }

  fn type_names(&self) -> impl Iterator<Item = &str> {
    self
      .params_type
      .iter()
      .chain(self.body_type.iter())
      .map(String::as_str)
      .chain(std::iter::once(self.result_type.as_str()).filter(|name| *name != "void"))
  }
}

/// The `api.ts` module of one tag and the wrappers it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainApi {
  pub content: String,
  pub wrappers: Vec<WrapperDef>,
}

/// `{verbPrefix}{PathSegments}`, e.g. `fetchUsersId` for `GET /users/{id}`.
pub fn wrapper_base_name(prefixes: &VerbPrefixes, method: &Method, path: &str) -> String {
  let segments: String = path
    .split('/')
    .map(|segment| segment.replace(['{', '}'], ""))
    .filter(|segment| !segment.is_empty())
    .map(|segment| to_pascal_case(&segment))
    .collect();
  let segments = if segments.is_empty() {
    ROOT_NAME.to_string()
  } else {
    segments
  };
  format!("{}{segments}", prefixes.prefix_for(method))
}

fn binding(key: &str, ident: &str) -> String {
  if key == ident {
    ident.to_string()
  } else {
    format!("{}: {ident}", property_key(key))
  }
}

/// Renders the statements of a wrapper body.
fn render_body(wrapper: &WrapperDef, operation: &OperationTypes, endpoint: &EndpointDef) -> Vec<String> {
  let mut used: BTreeSet<String> = RESERVED_BINDINGS.iter().map(ToString::to_string).collect();
  let mut bind = |name: &str| {
    let ident = ensure_unique(&to_identifier(name), &used);
    used.insert(ident.clone());
    ident
  };

  let mut bindings = vec![];
  let mut path_args = vec![];
  for (placeholder, _) in &endpoint.placeholders {
    let ident = bind(placeholder);
    bindings.push(binding(placeholder, &ident));
    path_args.push(ident);
  }

  // Declared path parameters missing from the template must not leak into the query string.
  for param in operation.parameters.iter().filter(|param| {
    param.location == ParameterLocation::Path
      && !endpoint.placeholders.iter().any(|(placeholder, _)| *placeholder == param.name)
  }) {
    let ident = bind(&param.name);
    bindings.push(binding(&param.name, &ident));
  }

  let mut headers = vec![];
  for param in operation
    .parameters
    .iter()
    .filter(|param| param.location == ParameterLocation::Header)
  {
    let ident = bind(&param.name);
    bindings.push(binding(&param.name, &ident));
    headers.push(format!("{}: {ident}", property_key(&param.name)));
  }

  let has_query = operation
    .parameters
    .iter()
    .any(|param| param.location == ParameterLocation::Query);

  let mut lines = vec![];
  let query_expr = match (wrapper.params_type.is_some(), bindings.is_empty()) {
    (false, _) => None,
    (true, true) => has_query.then(|| "params".to_string()),
    (true, false) => {
      let rest = if has_query { ", ...query" } else { "" };
      lines.push(format!("const {{ {}{rest} }} = params;", bindings.join(", ")));
      has_query.then(|| "params: query".to_string())
    }
  };

  let sends_body = BODY_METHODS.contains(&wrapper.method);
  let mut config = vec![];
  if let Some(query) = query_expr {
    config.push(query);
  }
  if !headers.is_empty() {
    config.push(format!("headers: {{ {} }}", headers.join(", ")));
  }
  if wrapper.body_type.is_some() && !sends_body {
    config.push("data: body".to_string());
  }
  let config = (!config.is_empty()).then(|| format!("{{ {} }}", config.join(", ")));

  let mut args = vec![endpoint.call(&path_args)];
  if sends_body && (wrapper.body_type.is_some() || config.is_some()) {
    let body = if wrapper.body_type.is_some() { "body" } else { "undefined" };
    args.push(body.to_string());
  }
  args.extend(config);

  lines.push(format!(
    "return handleResponse<{}>(http.{}({}));",
    wrapper.result_type,
    wrapper.method.as_str().to_ascii_lowercase(),
    args.join(", ")
  ));
  lines
}

fn render_wrapper(
  wrapper: &WrapperDef,
  operation: &OperationTypes,
  endpoint: &EndpointDef,
  templates: &DocTemplates,
) -> String {
  let context = DocContext {
    method: &wrapper.method,
    path: &wrapper.path,
    operation_id: &wrapper.operation_id,
    name: &wrapper.name,
  };
  let mut doc = DocTemplates::render(&templates.wrapper, &context);
  doc.push(format!("@operationId {}", wrapper.operation_id));

  let body = render_body(wrapper, operation, endpoint)
    .into_iter()
    .map(|line| format!("  {line}"))
    .join("\n");

  format!(
    "{}\nexport const {} = async ({}): Promise<{}> => {{\n{body}\n}};",
    doc_comment(&doc, 0),
    wrapper.name,
    wrapper.signature(),
    wrapper.result_type
  )
}

/// `api.ts` for one tag. `endpoints` must hold the endpoint planned for every operation.
pub fn generate_domain_api(
  server: &str,
  tag: &str,
  operations: &[OperationTypes],
  endpoints: &[EndpointDef],
  config: &CodegenConfig,
  imports: &dyn ImportResolver,
) -> anyhow::Result<DomainApi> {
  config.doc_templates.validate()?;

  if operations.is_empty() {
    return Ok(DomainApi {
      content: assemble_module([EMPTY_MODULE]),
      wrappers: vec![],
    });
  }

  let mut used: BTreeSet<String> = RUNTIME_NAMES.iter().map(ToString::to_string).collect();
  let mut wrappers = vec![];
  let mut blocks = vec![];
  let mut endpoint_names = BTreeSet::new();

  for operation in operations {
    let endpoint = endpoints
      .iter()
      .find(|endpoint| endpoint.operation_id == operation.operation_id)
      .with_context(|| format!("no endpoint planned for '{}' in {server}/{tag}", operation.operation_id))?;

    let name = ensure_unique(
      &wrapper_base_name(&config.verb_prefixes, &operation.method, &operation.path),
      &used,
    );
    used.insert(name.clone());

    let wrapper = WrapperDef {
      name,
      operation_id: operation.operation_id.clone(),
      method: operation.method.clone(),
      path: operation.path.clone(),
      params_type: operation.params_type().map(ToString::to_string),
      body_type: operation.body_type().map(ToString::to_string),
      result_type: operation.result_type(),
    };
    blocks.push(render_wrapper(&wrapper, operation, endpoint, &config.doc_templates));
    endpoint_names.insert(endpoint.name.as_str());
    wrappers.push(wrapper);
  }

  let import_block = [
    import_line(RUNTIME_NAMES, &imports.runtime_module(), false),
    import_line(endpoint_names, &imports.sibling_module(ArtifactKind::Endpoints), false),
    import_line(
      wrappers.iter().flat_map(WrapperDef::type_names),
      &imports.sibling_module(ArtifactKind::ValidatedTypes),
      true,
    ),
  ]
  .into_iter()
  .flatten()
  .join("\n");

  Ok(DomainApi {
    content: assemble_module(std::iter::once(import_block).chain(blocks)),
    wrappers,
  })
}
