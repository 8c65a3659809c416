use super::{members::members, refs::find_schema_ref};
use crate::generator::{
  ast::{PropertyInfo, PropertyPriority, SchemaDefinition},
  scanner::{Piece, Scanner, strip_comments},
};

/// Property name suffixes that mark a field as categorical.
pub(crate) const CATEGORICAL_SUFFIXES: [&str; 4] = ["Type", "Status", "State", "Mode"];

impl SchemaDefinition {
  /// Parses a schema body. Comments are stripped first so `@example` blocks
  /// inside JSDoc never turn into properties.
  pub fn parse(name: &str, body: &str) -> Self {
    let stripped = strip_comments(body);
    let properties = members(&stripped)
      .into_iter()
      .filter(|member| !member.name.starts_with('['))
      .map(|member| classify_property(&member.name, member.value, member.optional))
      .collect();

    Self {
      name: name.to_string(),
      body: body.to_string(),
      properties,
    }
  }
}

pub(crate) fn has_categorical_suffix(name: &str) -> bool {
  CATEGORICAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub(crate) fn classify_property(name: &str, type_text: &str, optional: bool) -> PropertyInfo {
  let type_text = type_text.trim();
  let enum_values = union_literals(type_text);
  let nested_schema = find_schema_ref(type_text).map(ToString::to_string);

  let priority = if enum_values.is_some() {
    PropertyPriority::EnumOrUnion
  } else if has_categorical_suffix(name) {
    PropertyPriority::SuffixMatch
  } else if nested_schema.is_some() {
    PropertyPriority::NestedReference
  } else {
    PropertyPriority::Baseline
  };

  PropertyInfo {
    name: name.to_string(),
    type_text: type_text.to_string(),
    optional,
    is_array: is_array_type(type_text),
    enum_values,
    nested_schema,
    priority,
  }
}

pub(crate) fn is_array_type(type_text: &str) -> bool {
  let trimmed = type_text.trim();
  trimmed.ends_with("[]") || trimmed.starts_with("Array<") || trimmed.starts_with("ReadonlyArray<")
}

/// Values of a union made only of string literals, e.g. `"a" | "b"`.
///
/// Unions that admit `null` or `undefined` are not treated as enums.
pub(crate) fn union_literals(type_text: &str) -> Option<Vec<String>> {
  let mut values = vec![];
  let mut expect_literal = true;

  for piece in Scanner::new(type_text, 0) {
    match piece {
      Piece::Quoted { start, end } if expect_literal => {
        let quote = type_text.as_bytes()[start];
        if quote == b'`' || end - start < 2 {
          return None;
        }
        values.push(type_text[start + 1..end - 1].to_string());
        expect_literal = false;
      }
      Piece::Code(index) => match type_text.as_bytes()[index] {
        byte if byte.is_ascii_whitespace() => {}
        b'|' if !expect_literal => expect_literal = true,
        b'|' if values.is_empty() => {}
        _ => return None,
      },
      Piece::Comment { .. } => {}
      Piece::Quoted { .. } => return None,
    }
  }

  (!values.is_empty() && !expect_literal).then_some(values)
}
