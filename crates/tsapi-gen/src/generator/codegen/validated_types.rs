use std::collections::{BTreeMap, BTreeSet};

use super::{ImportResolver, assemble_module, import_line};
use crate::{
  generator::{
    ast::TypeTarget,
    description::refs::{replace_schema_refs, schema_refs},
    extractor::{OperationTypes, collapse_group_headers, controller_group, group_header},
  },
  naming::identifiers::{ensure_unique, to_schema_type_name},
};

/// Local alias per referenced schema, unique against the exported aliases.
pub(crate) fn schema_locals<'a>(
  targets: impl IntoIterator<Item = &'a TypeTarget>,
  reserved: impl IntoIterator<Item = String>,
) -> BTreeMap<String, String> {
  let mut schemas = BTreeSet::new();
  for target in targets {
    match target {
      TypeTarget::Schema(name) | TypeTarget::SchemaArray(name) => {
        schemas.insert(name.clone());
      }
      TypeTarget::Inline(text) => schemas.extend(schema_refs(text).map(ToString::to_string)),
      TypeTarget::Void | TypeTarget::Fallback => {}
    }
  }

  let mut used: BTreeSet<String> = reserved.into_iter().collect();
  schemas
    .into_iter()
    .map(|schema| {
      let local = ensure_unique(&to_schema_type_name(&schema), &used);
      used.insert(local.clone());
      (schema, local)
    })
    .collect()
}

fn schema_access(schema: &str) -> String {
  format!("components['schemas']['{}']", schema.replace('\'', "\\'"))
}

pub(crate) fn render_target(target: &TypeTarget, locals: &BTreeMap<String, String>) -> String {
  let local = |name: &str| locals.get(name).cloned().unwrap_or_else(|| schema_access(name));
  match target {
    TypeTarget::Schema(name) => local(name.as_str()),
    TypeTarget::SchemaArray(name) => format!("{}[]", local(name.as_str())),
    TypeTarget::Inline(text) => replace_schema_refs(text, local),
    TypeTarget::Void => "void".to_string(),
    TypeTarget::Fallback => "unknown".to_string(),
  }
}

/// `types.ts` for one tag.
pub fn generate_validated_types(
  server: &str,
  tag: &str,
  operations: &[OperationTypes],
  imports: &dyn ImportResolver,
) -> String {
  let aliases: Vec<_> = operations.iter().flat_map(OperationTypes::aliases).collect();
  let locals = schema_locals(
    aliases.iter().map(|generated| &generated.target),
    aliases.iter().map(|generated| generated.name.clone()),
  );

  let import = if locals.is_empty() {
    None
  } else {
    import_line(["components"], &imports.schema_module(server, tag), true)
  };

  let local_lines: Vec<String> = locals
    .iter()
    .map(|(schema, local)| format!("type {local} = {};", schema_access(schema)))
    .collect();

  let blocks: Vec<String> = operations
    .iter()
    .map(|operation| {
      let mut block = group_header(&controller_group(&operation.path));
      for generated in operation.aliases() {
        block.push_str(&format!(
          "\nexport type {} = {};",
          generated.name,
          render_target(&generated.target, &locals)
        ));
      }
      block
    })
    .collect();
  let body = collapse_group_headers(&blocks.join("\n\n"));

  assemble_module([import.unwrap_or_default(), local_lines.join("\n"), body])
}
