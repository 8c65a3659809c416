//! String- and comment-aware scanning over interface description text.
//!
//! Everything structural in the parser sits on top of [`Scanner`], a small
//! finite-state machine that splits text into code bytes, quoted spans and
//! comments. Quoted spans and comments are opaque: delimiters inside them never
//! count towards nesting.

use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScanError {
  #[strum(to_string = "no opening delimiter at offset {index}")]
  NotAnOpening { index: usize },
  #[strum(to_string = "delimiter opened at offset {open_index} is never closed")]
  Unbalanced { open_index: usize },
}

impl std::error::Error for ScanError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
  Normal,
  InString(u8),
  InStringEscape(u8),
  InLineComment,
  InBlockComment,
}

/// One lexical piece of the scanned text. Offsets are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece {
  /// A single byte outside of any string or comment.
  Code(usize),
  /// A quoted span including both quotes. `end` is exclusive.
  Quoted { start: usize, end: usize },
  /// A `//` or `/* */` comment. Line comments stop before the newline.
  Comment { start: usize, end: usize },
}

pub(crate) struct Scanner<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Scanner<'a> {
  pub(crate) fn new(text: &'a str, start: usize) -> Self {
    Self {
      bytes: text.as_bytes(),
      pos: start,
    }
  }

  pub(crate) fn seek(&mut self, pos: usize) {
    self.pos = pos;
  }
}

impl Iterator for Scanner<'_> {
  type Item = Piece;

  fn next(&mut self) -> Option<Self::Item> {
    let start = self.pos;
    let len = self.bytes.len();
    let mut state = ScanState::Normal;

    while self.pos < len {
      let byte = self.bytes[self.pos];
      let next = self.bytes.get(self.pos + 1).copied();

      match state {
        ScanState::Normal => match (byte, next) {
          (b'"' | b'\'' | b'`', _) => {
            state = ScanState::InString(byte);
            self.pos += 1;
          }
          (b'/', Some(b'/')) => {
            state = ScanState::InLineComment;
            self.pos += 2;
          }
          (b'/', Some(b'*')) => {
            state = ScanState::InBlockComment;
            self.pos += 2;
          }
          _ => {
            self.pos += 1;
            return Some(Piece::Code(start));
          }
        },
        ScanState::InString(quote) => {
          self.pos += 1;
          if byte == b'\\' {
            state = ScanState::InStringEscape(quote);
          } else if byte == quote {
            return Some(Piece::Quoted { start, end: self.pos });
          }
        }
        ScanState::InStringEscape(quote) => {
          self.pos += 1;
          state = ScanState::InString(quote);
        }
        ScanState::InLineComment => {
          if byte == b'\n' {
            return Some(Piece::Comment { start, end: self.pos });
          }
          self.pos += 1;
        }
        ScanState::InBlockComment => {
          if byte == b'*' && next == Some(b'/') {
            self.pos += 2;
            return Some(Piece::Comment { start, end: self.pos });
          }
          self.pos += 1;
        }
      }
    }

    match state {
      ScanState::Normal => None,
      ScanState::InString(_) | ScanState::InStringEscape(_) => Some(Piece::Quoted { start, end: len }),
      ScanState::InLineComment | ScanState::InBlockComment => Some(Piece::Comment { start, end: len }),
    }
  }
}

const fn closing_for(open: u8) -> Option<u8> {
  match open {
    b'{' => Some(b'}'),
    b'[' => Some(b']'),
    b'(' => Some(b')'),
    _ => None,
  }
}

/// Finds the delimiter closing the one at `open_index`.
///
/// Only the delimiter pair found at `open_index` is counted, so a stray `]`
/// inside a `{ }` block does not matter. Returns the byte offset of the
/// closing delimiter.
pub fn match_close(text: &str, open_index: usize) -> Result<usize, ScanError> {
  let bytes = text.as_bytes();
  let Some((open, close)) = bytes
    .get(open_index)
    .and_then(|&open| closing_for(open).map(|close| (open, close)))
  else {
    return Err(ScanError::NotAnOpening { index: open_index });
  };

  let mut depth = 0usize;
  for piece in Scanner::new(text, open_index) {
    let Piece::Code(index) = piece else {
      continue;
    };
    let byte = bytes[index];
    if byte == open {
      depth += 1;
    } else if byte == close {
      depth -= 1;
      if depth == 0 {
        return Ok(index);
      }
    }
  }

  Err(ScanError::Unbalanced { open_index })
}

/// Returns the text between the delimiter at `open_index` and its match.
pub(crate) fn delimited_body(text: &str, open_index: usize) -> Result<&str, ScanError> {
  let close = match_close(text, open_index)?;
  Ok(&text[open_index + 1..close])
}

/// Removes `//`, `/* */` and `/** */` comments, leaving strings untouched.
///
/// Block comments collapse to a single space and line comments keep their
/// trailing newline, so member boundaries survive.
pub(crate) fn strip_comments(text: &str) -> String {
  let bytes = text.as_bytes();
  let mut out = Vec::with_capacity(bytes.len());

  for piece in Scanner::new(text, 0) {
    match piece {
      Piece::Code(index) => out.push(bytes[index]),
      Piece::Quoted { start, end } => out.extend_from_slice(&bytes[start..end]),
      Piece::Comment { start, .. } => {
        if bytes.get(start + 1) == Some(&b'*') {
          out.push(b' ');
        }
      }
    }
  }

  String::from_utf8_lossy(&out).into_owned()
}

/// Offset of the first code byte at or after `start` that is not whitespace.
pub(crate) fn skip_trivia(text: &str, start: usize) -> usize {
  let bytes = text.as_bytes();
  for piece in Scanner::new(text, start) {
    match piece {
      Piece::Code(index) if bytes[index].is_ascii_whitespace() => {}
      Piece::Comment { .. } => {}
      Piece::Code(index) | Piece::Quoted { start: index, .. } => return index,
    }
  }
  bytes.len()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_match_close_simple_block() {
    let text = "a { b { c } d } e";
    assert_eq!(match_close(text, 2), Ok(14));
    assert_eq!(match_close(text, 6), Ok(10));
  }

  #[test]
  fn test_match_close_ignores_braces_in_strings() {
    let text = r#"{ a: "{"; b: '}'; c: `{{`; }"#;
    assert_eq!(match_close(text, 0), Ok(text.len() - 1));
  }

  #[test]
  fn test_match_close_handles_escaped_quotes() {
    let text = r#"{ a: "\"{"; }"#;
    assert_eq!(match_close(text, 0), Ok(text.len() - 1));
  }

  #[test]
  fn test_match_close_ignores_comments() {
    let text = "{\n  // }\n  /* { */\n  a: string;\n}";
    assert_eq!(match_close(text, 0), Ok(text.len() - 1));
  }

  #[test]
  fn test_match_close_only_counts_own_pair() {
    let text = "[ { ] } ]";
    assert_eq!(match_close(text, 0), Ok(4));
    assert_eq!(match_close(text, 2), Ok(6));
  }

  #[test]
  fn test_match_close_errors() {
    assert_eq!(match_close("abc", 1), Err(ScanError::NotAnOpening { index: 1 }));
    assert_eq!(match_close("abc", 10), Err(ScanError::NotAnOpening { index: 10 }));
    assert_eq!(match_close("{ {", 0), Err(ScanError::Unbalanced { open_index: 0 }));
    assert_eq!(match_close("{ \"}", 0), Err(ScanError::Unbalanced { open_index: 0 }));
  }

  #[test]
  fn test_strip_comments_preserves_strings_and_newlines() {
    let text = "/** doc */\na: \"// not a comment\"; // trailing\nb: number; /* x */";
    let stripped = strip_comments(text);
    assert_eq!(stripped, " \na: \"// not a comment\"; \nb: number;  ");
  }

  #[test]
  fn test_strip_comments_keeps_non_ascii() {
    assert_eq!(strip_comments("/* é */ name: \"héllo\"; // ü"), "  name: \"héllo\"; ");
  }

  #[test]
  fn test_skip_trivia() {
    let text = "  /* a */ // b\n  x";
    assert_eq!(skip_trivia(text, 0), text.len() - 1);
    assert_eq!(skip_trivia("   ", 0), 3);
  }
}
