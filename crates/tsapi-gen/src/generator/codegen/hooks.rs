//! React-query hooks derived from a domain API module.
//!
//! Hooks are built from the text of `api.ts`, not from the extracted model, so
//! a hand-maintained API module works as well as a generated one. GET wrappers
//! become query hooks and every other method becomes a mutation hook. The types
//! of each hook come from the first [`HookTypeResolver`] that can answer.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::LazyLock,
};

use http::Method;
use itertools::Itertools;
use regex::Regex;

use super::{ArtifactKind, EMPTY_MODULE, ImportResolver, assemble_module, doc_comment, import_line};
use crate::{
  generator::{
    ast::{TypeKind, parse_method},
    config::{CodegenConfig, DocContext, DocTemplates, ErrorNotification, NotificationPolicy, VerbPrefixes},
    extractor::OperationTypes,
    metrics::GenerationWarning,
  },
  naming::identifiers::{ensure_unique, is_plain_identifier, to_pascal_case},
};

static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?ms)(?:/\*\*(?P<doc>(?:[^*]|\*[^/])*)\*/\s*)?^export const (?P<name>[A-Za-z_$][\w$]*)\s*=\s*async\s*\((?P<args>[^)]*)\)\s*(?::\s*Promise<(?P<ret>[^\n]*?)>)?\s*=>\s*\{(?P<body>.*?)^\};",
  )
  .expect("invalid regex")
});
static OPERATION_ID_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"@operationId\s+(\S+)").expect("invalid regex"));
static HTTP_CALL_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\bhttp\.([a-z]+)\s*[(<]").expect("invalid regex"));

const UNKNOWN_TYPE: &str = "unknown";
const ALIAS_KINDS: [TypeKind; 4] = [TypeKind::Params, TypeKind::Body, TypeKind::Response, TypeKind::Ro];

/// One argument of a parsed wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperArg {
  pub name: String,
  pub type_text: Option<String>,
}

/// A wrapper function found in a domain API module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWrapper {
  pub name: String,
  pub operation_id: Option<String>,
  /// Method of the `http` call in the body, when there is exactly one kind.
  pub method: Option<Method>,
  pub args: Vec<WrapperArg>,
  pub return_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgSlot {
  Params,
  Body,
}

impl ArgSlot {
  const fn variable(self) -> &'static str {
    match self {
      Self::Params => "params",
      Self::Body => "body",
    }
  }
}

const BODY_ARG: &str = "body";

impl ParsedWrapper {
  /// Maps the arguments onto the `(params, body)` convention, in declaration
  /// order. An argument named `body` always takes the body slot. `None` when the
  /// wrapper takes more arguments than that.
  fn slots(&self) -> Option<Vec<(ArgSlot, &WrapperArg)>> {
    match self.args.as_slice() {
      [] => Some(vec![]),
      [only] if only.name == BODY_ARG => Some(vec![(ArgSlot::Body, only)]),
      [only] => Some(vec![(ArgSlot::Params, only)]),
      [first, second] if first.name == BODY_ARG && second.name != BODY_ARG => {
        Some(vec![(ArgSlot::Body, first), (ArgSlot::Params, second)])
      }
      [first, second] => Some(vec![(ArgSlot::Params, first), (ArgSlot::Body, second)]),
      _ => None,
    }
  }

  /// The hook variables passed to the wrapper, in the order it declares them.
  fn call_args(&self) -> String {
    self
      .slots()
      .unwrap_or_default()
      .iter()
      .map(|(slot, _)| slot.variable())
      .join(", ")
  }

  fn has_slot(&self, slot: ArgSlot) -> bool {
    self
      .slots()
      .is_some_and(|slots| slots.iter().any(|(candidate, _)| *candidate == slot))
  }
}

/// Splits on commas that are not nested inside brackets.
fn split_top_level(text: &str) -> Vec<&str> {
  let mut parts = vec![];
  let mut depth = 0usize;
  let mut start = 0;
  for (index, c) in text.char_indices() {
    match c {
      '<' | '(' | '{' | '[' => depth += 1,
      '>' | ')' | '}' | ']' => depth = depth.saturating_sub(1),
      ',' if depth == 0 => {
        parts.push(&text[start..index]);
        start = index + 1;
      }
      _ => {}
    }
  }
  parts.push(&text[start..]);
  parts.into_iter().map(str::trim).filter(|part| !part.is_empty()).collect()
}

fn parse_arg(text: &str) -> WrapperArg {
  let text = text.split_once('=').map_or(text, |(declaration, _)| declaration).trim();
  match text.split_once(':') {
    Some((name, type_text)) => WrapperArg {
      name: name.trim().trim_end_matches('?').to_string(),
      type_text: Some(type_text.trim().to_string()).filter(|type_text| !type_text.is_empty()),
    },
    None => WrapperArg {
      name: text.trim_end_matches('?').to_string(),
      type_text: None,
    },
  }
}

/// Finds every `export const NAME = async (...) => { ... };` wrapper.
pub fn parse_wrappers(source: &str) -> Vec<ParsedWrapper> {
  WRAPPER_RE
    .captures_iter(source)
    .map(|caps| {
      let operation_id = caps
        .name("doc")
        .and_then(|doc| OPERATION_ID_RE.captures(doc.as_str()))
        .map(|id| id[1].to_string());
      let methods: BTreeSet<String> = caps.name("body").map_or_else(BTreeSet::new, |body| {
        HTTP_CALL_RE
          .captures_iter(body.as_str())
          .map(|call| call[1].to_string())
          .collect()
      });
      let method = match methods.iter().exactly_one() {
        Ok(method) => parse_method(method),
        Err(_) => None,
      };

      ParsedWrapper {
        name: caps["name"].to_string(),
        operation_id,
        method,
        args: split_top_level(&caps["args"]).into_iter().map(parse_arg).collect(),
        return_type: caps
          .name("ret")
          .map(|ret| ret.as_str().trim().to_string())
          .filter(|ret| !ret.is_empty()),
      }
    })
    .collect()
}

/// The types a hook is written against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookTypes {
  pub params: Option<String>,
  pub body: Option<String>,
  pub result: String,
}

impl HookTypes {
  fn fallback(wrapper: &ParsedWrapper) -> Self {
    Self {
      params: None,
      body: None,
      result: UNKNOWN_TYPE.to_string(),
    }
    .fit(wrapper)
  }

  /// Aligns the argument types with the arguments the wrapper actually takes.
  #[must_use]
  fn fit(self, wrapper: &ParsedWrapper) -> Self {
    let keep = |slot: ArgSlot, value: Option<String>| {
      wrapper
        .has_slot(slot)
        .then(|| value.unwrap_or_else(|| UNKNOWN_TYPE.to_string()))
    };
    Self {
      params: keep(ArgSlot::Params, self.params),
      body: keep(ArgSlot::Body, self.body),
      result: self.result,
    }
  }

  fn variables(&self) -> String {
    match (&self.params, &self.body) {
      (Some(params), Some(body)) => format!("{{ params: {params}; body: {body} }}"),
      (Some(only), None) | (None, Some(only)) => only.clone(),
      (None, None) => "void".to_string(),
    }
  }

  fn names(&self) -> impl Iterator<Item = &str> {
    self
      .params
      .iter()
      .chain(self.body.iter())
      .chain(std::iter::once(&self.result))
      .map(String::as_str)
  }
}

/// One way of finding the types of a wrapper.
pub trait HookTypeResolver {
  fn name(&self) -> &'static str;

  fn resolve(&self, wrapper: &ParsedWrapper) -> Option<HookTypes>;
}

/// Reads the types from the wrapper's own signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureResolver;

impl HookTypeResolver for SignatureResolver {
  fn name(&self) -> &'static str {
    "signature"
  }

  fn resolve(&self, wrapper: &ParsedWrapper) -> Option<HookTypes> {
    let result = wrapper.return_type.clone()?;
    let mut types = HookTypes {
      params: None,
      body: None,
      result,
    };
    for (slot, arg) in wrapper.slots()? {
      let type_text = arg.type_text.clone()?;
      match slot {
        ArgSlot::Params => types.params = Some(type_text),
        ArgSlot::Body => types.body = Some(type_text),
      }
    }
    Some(types)
  }
}

/// Looks the wrapper's `@operationId` up in the operations of the tag.
#[derive(Debug, Clone, Copy)]
pub struct OperationIdResolver<'a> {
  operations: &'a [OperationTypes],
}

impl<'a> OperationIdResolver<'a> {
  pub fn new(operations: &'a [OperationTypes]) -> Self {
    Self { operations }
  }
}

impl HookTypeResolver for OperationIdResolver<'_> {
  fn name(&self) -> &'static str {
    "operationId"
  }

  fn resolve(&self, wrapper: &ParsedWrapper) -> Option<HookTypes> {
    let operation_id = wrapper.operation_id.as_deref()?;
    let operation = self
      .operations
      .iter()
      .find(|operation| operation.operation_id == operation_id)?;
    Some(HookTypes {
      params: operation.params_type().map(ToString::to_string),
      body: operation.body_type().map(ToString::to_string),
      result: operation.result_type(),
    })
  }
}

fn match_key(text: &str) -> String {
  text
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .map(|c| c.to_ascii_lowercase())
    .collect()
}

/// Matches the wrapper name against the generated alias names.
///
/// Names are compared lowercase with punctuation removed. An operation matches
/// when its id is a prefix or suffix of the wrapper name, or when the wrapper
/// name without its verb prefix is a prefix or suffix of the id. The longest
/// matching id wins.
#[derive(Debug, Clone)]
pub struct NameInferenceResolver {
  type_names: BTreeSet<String>,
  prefixes: Vec<String>,
}

impl NameInferenceResolver {
  pub fn new<I, S>(type_names: I, prefixes: &VerbPrefixes) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      type_names: type_names.into_iter().map(Into::into).collect(),
      prefixes: prefixes.prefixes().map(match_key).collect(),
    }
  }

  fn operation_ids(&self) -> BTreeSet<&str> {
    self
      .type_names
      .iter()
      .filter_map(|name| {
        ALIAS_KINDS
          .iter()
          .find_map(|kind| name.strip_suffix(&format!("_{kind}")))
      })
      .collect()
  }

  fn alias(&self, operation_id: &str, kind: TypeKind) -> Option<String> {
    let name = kind.alias_name(operation_id);
    self.type_names.contains(&name).then_some(name)
  }
}

impl HookTypeResolver for NameInferenceResolver {
  fn name(&self) -> &'static str {
    "name inference"
  }

  fn resolve(&self, wrapper: &ParsedWrapper) -> Option<HookTypes> {
    let wrapper_key = match_key(&wrapper.name);
    let stem = self
      .prefixes
      .iter()
      .filter_map(|prefix| wrapper_key.strip_prefix(prefix.as_str()))
      .filter(|stem| !stem.is_empty())
      .min_by_key(|stem| stem.len())
      .unwrap_or(wrapper_key.as_str());

    let mut best: Option<(&str, usize)> = None;
    for operation_id in self.operation_ids() {
      let key = match_key(operation_id);
      if key.is_empty() {
        continue;
      }
      let matches = wrapper_key.starts_with(&key)
        || wrapper_key.ends_with(&key)
        || key.starts_with(stem)
        || key.ends_with(stem);
      if matches && best.is_none_or(|(_, len)| key.len() > len) {
        best = Some((operation_id, key.len()));
      }
    }

    let (operation_id, _) = best?;
    let result = self
      .alias(operation_id, TypeKind::Ro)
      .or_else(|| self.alias(operation_id, TypeKind::Response))?;
    Some(HookTypes {
      params: self.alias(operation_id, TypeKind::Params),
      body: self.alias(operation_id, TypeKind::Body),
      result,
    })
  }
}

/// Tries each resolver in order. Falls back to `unknown` types with a warning.
pub fn resolve_hook_types(
  resolvers: &[&dyn HookTypeResolver],
  wrapper: &ParsedWrapper,
  warnings: &mut Vec<GenerationWarning>,
) -> HookTypes {
  if let Some(types) = resolvers.iter().find_map(|resolver| resolver.resolve(wrapper)) {
    return types.fit(wrapper);
  }
  let tried = resolvers.iter().map(|resolver| resolver.name()).join(", ");
  warnings.push(GenerationWarning::unresolvable(
    wrapper.operation_id.as_deref().unwrap_or(wrapper.name.as_str()),
    format!("no hook types for wrapper '{}' (tried {tried}), using unknown", wrapper.name),
  ));
  HookTypes::fallback(wrapper)
}

/// The generated `queries.ts` and `mutations.ts` of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookModules {
  pub queries: String,
  pub mutations: String,
  pub query_hooks: Vec<String>,
  pub mutation_hooks: Vec<String>,
}

struct HookPlan<'a> {
  hook: String,
  wrapper: &'a ParsedWrapper,
  method: Method,
  path: String,
  types: HookTypes,
}

impl HookPlan<'_> {
  fn doc(&self, template: &str) -> String {
    let context = DocContext {
      method: &self.method,
      path: &self.path,
      operation_id: self.wrapper.operation_id.as_deref().unwrap_or_default(),
      name: &self.wrapper.name,
    };
    doc_comment(&DocTemplates::render(template, &context), 0)
  }

  fn render_query(&self, template: &str) -> String {
    let result = &self.types.result;
    let mut args = vec![];
    let mut values = vec![];
    if let Some(params) = &self.types.params {
      args.push(format!("params: {params}"));
      values.push("params");
    }
    if let Some(body) = &self.types.body {
      args.push(format!("body: {body}"));
      values.push("body");
    }
    args.push(format!(
      "options?: Omit<UseQueryOptions<{result}>, 'queryKey' | 'queryFn'>"
    ));

    let key = std::iter::once(format!("'{}'", self.wrapper.name))
      .chain(values.iter().map(ToString::to_string))
      .join(", ");

    format!(
      "{}\nexport const {} = ({}) =>\n  useQuery<{result}>({{\n    queryKey: [{key}],\n    queryFn: () => {}({}),\n    ...options,\n  }});",
      self.doc(template),
      self.hook,
      args.join(", "),
      self.wrapper.name,
      self.wrapper.call_args()
    )
  }

  fn render_mutation(&self, template: &str, policy: &NotificationPolicy) -> String {
    let variables = self.types.variables();
    let mutation_fn = match (&self.types.params, &self.types.body) {
      (Some(_), Some(_)) => format!("({{ params, body }}) => {}({})", self.wrapper.name, self.wrapper.call_args()),
      (Some(_), None) => format!("(params) => {}(params)", self.wrapper.name),
      (None, Some(_)) => format!("(body) => {}(body)", self.wrapper.name),
      (None, None) => format!("() => {}()", self.wrapper.name),
    };

    let mut lines = vec![format!("    mutationFn: {mutation_fn},")];
    match policy.on_error {
      ErrorNotification::None => {}
      ErrorNotification::Console => lines.push(format!(
        "    onError: (error) => {{\n      console.error('[{}]', error);\n    }},",
        self.wrapper.name
      )),
      ErrorNotification::Toast => {
        lines.push("    onError: (error) => {\n      notify.error(error.message);\n    },".to_string());
      }
    }
    if policy.on_success {
      lines.push(format!(
        "    onSuccess: () => {{\n      notify.success('{}');\n    }},",
        policy.success_message.replace('\\', "\\\\").replace('\'', "\\'")
      ));
    }

    format!(
      "{}\nexport const {} = () =>\n  useMutation<{}, Error, {variables}>({{\n{}\n  }});",
      self.doc(template),
      self.hook,
      self.types.result,
      lines.join("\n")
    )
  }
}

fn hook_module(imports: Vec<Option<String>>, blocks: &[String]) -> String {
  if blocks.is_empty() {
    return assemble_module([EMPTY_MODULE]);
  }
  let import_block = imports.into_iter().flatten().join("\n");
  assemble_module(std::iter::once(import_block).chain(blocks.iter().cloned()))
}

/// `queries.ts` and `mutations.ts` for one tag, read from its `api.ts`.
pub fn generate_hooks(
  api_source: &str,
  operations: &[OperationTypes],
  config: &CodegenConfig,
  imports: &dyn ImportResolver,
  warnings: &mut Vec<GenerationWarning>,
) -> anyhow::Result<HookModules> {
  config.doc_templates.validate()?;

  let wrappers = parse_wrappers(api_source);
  let by_id: BTreeMap<&str, &OperationTypes> = operations
    .iter()
    .map(|operation| (operation.operation_id.as_str(), operation))
    .collect();
  let type_names: BTreeSet<String> = operations
    .iter()
    .flat_map(OperationTypes::aliases)
    .map(|generated| generated.name.clone())
    .collect();

  let signature = SignatureResolver;
  let by_operation_id = OperationIdResolver::new(operations);
  let by_name = NameInferenceResolver::new(type_names.iter().cloned(), &config.verb_prefixes);
  let resolvers: [&dyn HookTypeResolver; 3] = [&signature, &by_operation_id, &by_name];

  let mut used: BTreeSet<String> = wrappers.iter().map(|wrapper| wrapper.name.clone()).collect();
  let mut plans = vec![];
  for wrapper in &wrappers {
    let operation = wrapper.operation_id.as_deref().and_then(|id| by_id.get(id).copied());
    let method = wrapper
      .method
      .clone()
      .or_else(|| operation.map(|operation| operation.method.clone()))
      .or_else(|| config.verb_prefixes.method_for_name(&wrapper.name));
    let Some(method) = method else {
      warnings.push(GenerationWarning::unresolvable(
        wrapper.operation_id.as_deref().unwrap_or(wrapper.name.as_str()),
        format!("cannot tell the HTTP method of wrapper '{}', no hook generated", wrapper.name),
      ));
      continue;
    };

    let hook = ensure_unique(&format!("use{}", to_pascal_case(&wrapper.name)), &used);
    used.insert(hook.clone());

    plans.push(HookPlan {
      hook,
      wrapper,
      path: operation.map(|operation| operation.path.clone()).unwrap_or_default(),
      types: resolve_hook_types(&resolvers, wrapper, warnings),
      method,
    });
  }

  let (query_plans, mutation_plans): (Vec<_>, Vec<_>) = plans.iter().partition(|plan| plan.method == Method::GET);
  let templates = &config.doc_templates;
  let api_module = imports.sibling_module(ArtifactKind::DomainApi);
  let types_module = imports.sibling_module(ArtifactKind::ValidatedTypes);
  let generated_names = |plans: &[&HookPlan<'_>]| {
    plans
      .iter()
      .flat_map(|plan| plan.types.names())
      .filter(|name| is_plain_identifier(name) && type_names.contains(*name))
      .map(ToString::to_string)
      .collect::<BTreeSet<String>>()
  };

  let query_types = generated_names(&query_plans);
  let queries = hook_module(
    vec![
      import_line(["useQuery"], &imports.query_module(), false),
      import_line(["UseQueryOptions"], &imports.query_module(), true),
      import_line(query_plans.iter().map(|plan| plan.wrapper.name.as_str()), &api_module, false),
      import_line(query_types.iter().map(String::as_str), &types_module, true),
    ],
    &query_plans
      .iter()
      .map(|plan| plan.render_query(&templates.query_hook))
      .collect::<Vec<_>>(),
  );

  let policy = &config.notifications;
  let mutation_types = generated_names(&mutation_plans);
  let notifier = policy.uses_notifier().then(|| imports.notifier_module());
  let mutations = hook_module(
    vec![
      import_line(["useMutation"], &imports.query_module(), false),
      notifier.and_then(|module| import_line(["notify"], &module, false)),
      import_line(mutation_plans.iter().map(|plan| plan.wrapper.name.as_str()), &api_module, false),
      import_line(mutation_types.iter().map(String::as_str), &types_module, true),
    ],
    &mutation_plans
      .iter()
      .map(|plan| plan.render_mutation(&templates.mutation_hook, policy))
      .collect::<Vec<_>>(),
  );

  Ok(HookModules {
    queries,
    mutations,
    query_hooks: query_plans.iter().map(|plan| plan.hook.clone()).collect(),
    mutation_hooks: mutation_plans.iter().map(|plan| plan.hook.clone()).collect(),
  })
}
