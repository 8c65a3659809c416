use std::{
  char::{ToLowercase, ToUppercase},
  collections::{BTreeSet, HashSet},
  iter::Peekable,
  sync::LazyLock,
};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

/// Words TypeScript will not accept as a binding name.
static RESERVED_WORDS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do", "else", "enum",
    "export", "extends", "false", "finally", "for", "function", "if", "import", "in", "instanceof", "new", "null",
    "return", "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "as",
    "implements", "interface", "let", "package", "private", "protected", "public", "static", "yield", "await",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Fixed replacement for property names made only of digits.
pub(crate) const NUMERIC_PROPERTY_NAME: &str = "NumericKey";

const BOOLEAN_PREFIXES: [&str; 4] = ["is", "has", "allow", "hide"];

/// Transliterates to ASCII, replaces invalid characters with underscores,
/// collapses runs of underscores and trims them from both ends.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Splits a PascalCase string into words.
/// Handles adjacent uppercase letters correctly (e.g., `"XMLParser"` -> `["XML", "Parser"]`).
pub(crate) fn split_pascal_case(name: &str) -> Vec<String> {
  if name.is_empty() {
    return vec![];
  }

  let mut words = vec![];
  let mut current_word = String::new();
  let chars: Vec<char> = name.chars().collect();

  for (i, &ch) in chars.iter().enumerate() {
    if ch.is_uppercase() && !current_word.is_empty() {
      let prev_is_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
      let next_is_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();

      if prev_is_lower || next_is_lower {
        words.push(std::mem::take(&mut current_word));
      }
    }
    current_word.push(ch);
  }

  if !current_word.is_empty() {
    words.push(current_word);
  }

  words
}

/// Appends the smallest numeric suffix (starting at 2) that makes `base_name` unused.
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  let mut i = 2;
  loop {
    let new_name = format!("{base_name}{i}");
    if !used_names.contains(&new_name) {
      return new_name;
    }
    i += 1;
  }
}

/// Converts a name into `PascalCase`.
///
/// Names that already mix upper and lower case without separators keep their
/// capitalization (`tournamentType` -> `TournamentType`, `HTTPProxy` stays).
/// Everything else is split on separators and case boundaries.
pub(crate) fn to_pascal_case(name: &str) -> String {
  let ascii = any_ascii(name);
  let has_separators = ascii.contains(['-', '_', '.', ' ', '/', '{', '}']);
  let has_upper = ascii.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = ascii.chars().any(|c| c.is_ascii_lowercase());

  if !has_separators && has_upper && has_lower {
    let cleaned: String = ascii.chars().filter(char::is_ascii_alphanumeric).collect();
    let mut chars = cleaned.chars();
    return match chars.next() {
      None => String::new(),
      Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    };
  }

  ascii
    .chars()
    .capitalize_words_with_boundaries()
    .filter(char::is_ascii_alphanumeric)
    .collect()
}

/// Converts a name into a binding-safe `camelCase` identifier.
pub(crate) fn to_identifier(name: &str) -> String {
  let mut ident = sanitize(name).to_camel_case();
  if ident.is_empty() {
    return "_".to_string();
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }
  if RESERVED_WORDS.contains(ident.as_str()) {
    ident.push('_');
  }
  ident
}

/// Converts a name into `SCREAMING_SNAKE_CASE`.
pub(crate) fn to_constant_case(name: &str) -> String {
  sanitize(name).to_constant_case()
}

/// Whether `name` can be used as an object key without quotes.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
  IDENTIFIER_RE.is_match(name)
}

/// Renders an object key, quoting it when it is not a plain identifier.
pub(crate) fn property_key(name: &str) -> String {
  if is_plain_identifier(name) {
    name.to_string()
  } else {
    format!("'{}'", name.replace('\'', "\\'"))
  }
}

fn has_boolean_prefix(name: &str) -> bool {
  BOOLEAN_PREFIXES.iter().any(|prefix| {
    name
      .strip_prefix(prefix)
      .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase() || c == '_'))
  })
}

/// A type-safe name for a schema: plain identifiers are kept, anything else
/// (such as `Page«User»`) is sanitized into `PascalCase`.
pub(crate) fn to_schema_type_name(schema: &str) -> String {
  if is_plain_identifier(schema) {
    schema.to_string()
  } else {
    to_pascal_case(&sanitize(schema))
  }
}

/// Derives the PascalCase segment used for a property's type alias.
///
/// `Url` and `Id` words become `URL` and `ID`, except for boolean-style names
/// (`isUrlValid`), which keep the plain case conversion. Names made only of
/// digits map to [`NUMERIC_PROPERTY_NAME`].
pub(crate) fn to_property_type_segment(name: &str) -> String {
  if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
    return NUMERIC_PROPERTY_NAME.to_string();
  }

  let pascal = to_pascal_case(name);
  if pascal.is_empty() {
    return "Unnamed".to_string();
  }
  if has_boolean_prefix(name) {
    return pascal;
  }

  split_pascal_case(&pascal)
    .into_iter()
    .map(|word| match word.as_str() {
      "Url" => "URL".to_string(),
      "Id" => "ID".to_string(),
      _ => word,
    })
    .collect()
}

/// Builds an id for an operation that has none, e.g. `get_users_by_id`.
pub(crate) fn generate_operation_id<S>(method: S, path: S) -> String
where
  S: AsRef<str>,
{
  let path_parts = path
    .as_ref()
    .split('/')
    .filter(|s| !s.is_empty())
    .map(|s| {
      if s.starts_with('{') && s.ends_with('}') {
        "by_id".to_string()
      } else {
        sanitize(s)
      }
    })
    .collect::<Vec<_>>();

  if path_parts.is_empty() {
    method.as_ref().to_lowercase()
  } else {
    format!("{}_{}", method.as_ref(), path_parts.join("_")).to_lowercase()
  }
}

/// An extension trait for char iterators to add word capitalization.
pub trait CapitalizeWordsExt: Iterator<Item = char> {
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized;
}

impl<I> CapitalizeWordsExt for I
where
  I: Iterator<Item = char>,
{
  fn capitalize_words_with_boundaries(self) -> CapitalizeWordsWithBoundaries<Self>
  where
    Self: Sized,
  {
    CapitalizeWordsWithBoundaries {
      iter: self.peekable(),
      capitalize_next: true,
      prev_was_lower: false,
      pending_upper: None,
      pending_lower: None,
    }
  }
}

pub struct CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  iter: Peekable<I>,
  capitalize_next: bool,
  prev_was_lower: bool,
  pending_upper: Option<ToUppercase>,
  pending_lower: Option<ToLowercase>,
}

impl<I> Iterator for CapitalizeWordsWithBoundaries<I>
where
  I: Iterator<Item = char>,
{
  type Item = char;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if let Some(ref mut upper_iter) = self.pending_upper {
      if let Some(c) = upper_iter.next() {
        return Some(c);
      }
      self.pending_upper = None;
    }

    if let Some(ref mut lower_iter) = self.pending_lower {
      if let Some(c) = lower_iter.next() {
        return Some(c);
      }
      self.pending_lower = None;
    }

    let c = self.iter.next()?;

    if !c.is_ascii_alphanumeric() {
      self.capitalize_next = self.iter.peek().is_some_and(char::is_ascii_alphanumeric);
      self.prev_was_lower = false;
      return Some(c);
    }

    let is_lower = c.is_ascii_lowercase();
    let is_upper = c.is_ascii_uppercase();

    let should_capitalize = self.capitalize_next
      || (self.prev_was_lower && is_upper)
      || (is_upper && self.iter.peek().is_some_and(char::is_ascii_lowercase));

    self.prev_was_lower = is_lower;
    self.capitalize_next = false;

    if should_capitalize {
      let mut upper = c.to_uppercase();
      let first = upper.next();
      self.pending_upper = Some(upper);
      first
    } else {
      let mut lower = c.to_lowercase();
      let first = lower.next();
      self.pending_lower = Some(lower);
      first
    }
  }
}
