use std::sync::LazyLock;

use regex::Regex;

const SCHEMA_REF_PATTERN: &str = r#"components\s*\[\s*["']schemas["']\s*\]\s*\[\s*["']([^"']+)["']\s*\]"#;

static SCHEMA_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SCHEMA_REF_PATTERN).expect("invalid regex"));

static DIRECT_SCHEMA_REF_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(&format!(r"^{SCHEMA_REF_PATTERN}$")).expect("invalid regex"));

static SCHEMA_ARRAY_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(&format!(
    r"^(?:{SCHEMA_REF_PATTERN}\s*\[\s*\]|Array\s*<\s*{SCHEMA_REF_PATTERN}\s*>)$"
  ))
  .expect("invalid regex")
});

static OPERATION_REF_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^operations\s*\[\s*["']([^"']+)["']\s*\]$"#).expect("invalid regex"));

/// The first schema referenced anywhere in `type_text`.
pub(crate) fn find_schema_ref(type_text: &str) -> Option<&str> {
  SCHEMA_REF_RE
    .captures(type_text)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

/// All schemas referenced in `type_text`, in order of appearance.
pub(crate) fn schema_refs(type_text: &str) -> impl Iterator<Item = &str> {
  SCHEMA_REF_RE
    .captures_iter(type_text)
    .filter_map(|caps| caps.get(1))
    .map(|m| m.as_str())
}

/// Rewrites every schema reference in `type_text` with `replace(name)`.
pub(crate) fn replace_schema_refs(type_text: &str, mut replace: impl FnMut(&str) -> String) -> String {
  SCHEMA_REF_RE
    .replace_all(type_text, |caps: &regex::Captures<'_>| replace(&caps[1]))
    .into_owned()
}

/// The schema name when `type_text` is exactly one schema reference.
pub(crate) fn direct_schema_ref(type_text: &str) -> Option<&str> {
  DIRECT_SCHEMA_REF_RE
    .captures(type_text.trim())
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

/// The element schema when `type_text` is `X[]` or `Array<X>` of one schema reference.
pub(crate) fn array_schema_ref(type_text: &str) -> Option<&str> {
  SCHEMA_ARRAY_REF_RE
    .captures(type_text.trim())
    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
    .map(|m| m.as_str())
}

/// The operation id when `type_text` is `operations['id']`.
pub(crate) fn operation_ref(type_text: &str) -> Option<&str> {
  OPERATION_REF_RE
    .captures(type_text.trim())
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_schema_refs_accept_both_quote_styles() {
    assert_eq!(direct_schema_ref(r#"components["schemas"]["User"]"#), Some("User"));
    assert_eq!(direct_schema_ref("components['schemas']['User']"), Some("User"));
    assert_eq!(direct_schema_ref(r#" components[ "schemas" ][ "User" ] "#), Some("User"));
    assert_eq!(direct_schema_ref(r#"components["schemas"]["User"][]"#), None);
    assert_eq!(direct_schema_ref(r#"components["responses"]["User"]"#), None);
  }

  #[test]
  fn test_array_schema_ref() {
    assert_eq!(array_schema_ref(r#"components["schemas"]["User"][]"#), Some("User"));
    assert_eq!(array_schema_ref(r#"Array<components["schemas"]["User"]>"#), Some("User"));
    assert_eq!(array_schema_ref(r#"components["schemas"]["User"]"#), None);
  }

  #[test]
  fn test_find_schema_refs() {
    let text = r#"{ a: components["schemas"]["A"]; b: components['schemas']['B'][] }"#;
    assert_eq!(find_schema_ref(text), Some("A"));
    assert_eq!(schema_refs(text).collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(find_schema_ref("string"), None);
  }

  #[test]
  fn test_replace_schema_refs() {
    let text = r#"{ a: components["schemas"]["A"]; b: components['schemas']['B'][] }"#;
    assert_eq!(replace_schema_refs(text, |name| format!("Local{name}")), "{ a: LocalA; b: LocalB[] }");
  }

  #[test]
  fn test_operation_ref() {
    assert_eq!(operation_ref(r#"operations["getUserById"]"#), Some("getUserById"));
    assert_eq!(operation_ref("operations['listUsers']"), Some("listUsers"));
    assert_eq!(operation_ref("never"), None);
  }
}
