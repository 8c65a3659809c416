use super::{EMPTY_MODULE, ImportResolver, assemble_module, import_line};
use crate::generator::{ast::TypeTarget, schema_walker::PropertyAliases};

/// `props.ts` for one tag: one block per schema, in walk order.
pub fn generate_property_types(
  server: &str,
  tag: &str,
  aliases: &PropertyAliases,
  imports: &dyn ImportResolver,
) -> String {
  if aliases.is_empty() {
    return assemble_module([EMPTY_MODULE]);
  }

  let mut blocks: Vec<String> = vec![];
  let mut current_schema: Option<&str> = None;
  for alias in aliases.iter() {
    let TypeTarget::Inline(access) = &alias.generated.target else {
      continue;
    };
    let line = format!("export type {} = {access};", alias.generated.name);
    match blocks.last_mut() {
      Some(block) if current_schema == Some(alias.schema.as_str()) => {
        block.push('\n');
        block.push_str(&line);
      }
      _ => {
        blocks.push(format!("// {}\n{line}", alias.schema));
        current_schema = Some(alias.schema.as_str());
      }
    }
  }

  let import = import_line(["components"], &imports.schema_module(server, tag), true).unwrap_or_default();
  assemble_module(std::iter::once(import).chain(blocks))
}
