use std::sync::LazyLock;

use regex::Regex;

use crate::generator::scanner::{Piece, Scanner, delimited_body, match_close, skip_trivia};

static NEXT_MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^\s*(?:readonly\s+)?(?:"[^"]*"|'[^']*'|[A-Za-z0-9_$]+)\s*\??\s*:"#).expect("invalid member regex")
});

/// One `name?: value` entry found directly inside a type-literal body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Member<'a> {
  pub(crate) name: String,
  pub(crate) optional: bool,
  pub(crate) value: &'a str,
}

impl<'a> Member<'a> {
  /// The inside of the value when it is a `{ ... }` literal.
  pub(crate) fn block(&self) -> Option<&'a str> {
    braced_body(self.value)
  }

  pub(crate) fn is_placeholder(&self) -> bool {
    is_placeholder_type(self.value)
  }
}

/// `never`, `undefined` and `{}` mark slots that carry no type.
pub(crate) fn is_placeholder_type(value: &str) -> bool {
  let value = value.trim();
  value == "never" || value == "undefined" || braced_body(value).is_some_and(|body| body.trim().is_empty())
}

pub(crate) fn braced_body(value: &str) -> Option<&str> {
  let trimmed = value.trim_start();
  if !trimmed.starts_with('{') {
    return None;
  }
  let body = delimited_body(trimmed, 0).ok()?;
  trimmed[body.len() + 2..].trim().is_empty().then_some(body)
}

const fn is_key_byte(byte: u8) -> bool {
  byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

/// Splits a type-literal body into its top-level members.
///
/// Nested literals are skipped whole, so only members at depth zero are
/// returned. Method signatures and anything else without a `:` are ignored.
pub(crate) fn members(body: &str) -> Vec<Member<'_>> {
  let bytes = body.as_bytes();
  let len = bytes.len();
  let mut found = vec![];
  let mut pos = 0;

  while pos < len {
    pos = skip_separators(body, pos);
    if pos >= len {
      break;
    }

    let Some((mut name, mut after_key)) = read_key(body, pos) else {
      pos = value_end(body, pos) + 1;
      continue;
    };

    if name == "readonly" {
      let next = skip_trivia(body, after_key);
      if next > after_key
        && let Some((inner, inner_end)) = read_key(body, next)
      {
        name = inner;
        after_key = inner_end;
      }
    }

    let mut cursor = skip_trivia(body, after_key);
    let optional = bytes.get(cursor) == Some(&b'?');
    if optional {
      cursor = skip_trivia(body, cursor + 1);
    }

    if bytes.get(cursor) != Some(&b':') {
      pos = value_end(body, cursor) + 1;
      continue;
    }

    let start = cursor + 1;
    let end = value_end(body, start);
    found.push(Member {
      name,
      optional,
      value: body[start..end].trim(),
    });
    pos = end + 1;
  }

  found
}

/// Looks up one member by name.
pub(crate) fn find_member<'a>(body: &'a str, name: &str) -> Option<Member<'a>> {
  members(body).into_iter().find(|member| member.name == name)
}

fn skip_separators(body: &str, mut pos: usize) -> usize {
  let bytes = body.as_bytes();
  loop {
    pos = skip_trivia(body, pos);
    match bytes.get(pos) {
      Some(b';' | b',') => pos += 1,
      _ => return pos,
    }
  }
}

fn read_key(body: &str, pos: usize) -> Option<(String, usize)> {
  let bytes = body.as_bytes();
  match bytes.get(pos)? {
    b'"' | b'\'' => {
      let Some(Piece::Quoted { start, end }) = Scanner::new(body, pos).next() else {
        return None;
      };
      let inner = body.get(start + 1..end.saturating_sub(1))?;
      Some((inner.replace("\\\"", "\"").replace("\\'", "'"), end))
    }
    b'[' => {
      let close = match_close(body, pos).ok()?;
      Some((body[pos..=close].to_string(), close + 1))
    }
    &byte if is_key_byte(byte) => {
      let end = bytes[pos..]
        .iter()
        .position(|&b| !is_key_byte(b))
        .map_or(bytes.len(), |offset| pos + offset);
      Some((body[pos..end].to_string(), end))
    }
    _ => None,
  }
}

/// Offset of the `;`/`,` (or line break before the next member) ending the
/// value starting at `start`, or the body length.
fn value_end(body: &str, start: usize) -> usize {
  let bytes = body.as_bytes();
  let len = bytes.len();
  let mut angle_depth = 0usize;
  let mut scanner = Scanner::new(body, start);

  while let Some(piece) = scanner.next() {
    let Piece::Code(index) = piece else {
      continue;
    };

    match bytes[index] {
      b'{' | b'[' | b'(' => match match_close(body, index) {
        Ok(close) => scanner.seek(close + 1),
        Err(_) => return len,
      },
      b'<' => angle_depth += 1,
      b'>' if index > 0 && bytes[index - 1] == b'=' => {}
      b'>' => angle_depth = angle_depth.saturating_sub(1),
      b';' | b',' if angle_depth == 0 => return index,
      b'\n' if angle_depth == 0 && ends_member_line(body, start, index) => return index,
      _ => {}
    }
  }

  len
}

fn ends_member_line(body: &str, start: usize, newline: usize) -> bool {
  let before = body[start..newline].trim_end();
  if before.is_empty() || before.ends_with(['|', '&', ':', '=', '<', ',']) {
    return false;
  }
  let next = skip_trivia(body, newline + 1);
  NEXT_MEMBER_RE.is_match(&body[next..])
}
