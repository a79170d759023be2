//! Glob matching for key enumeration.
//!
//! Supports `*`, `?`, character classes (`[abc]`, `[a-z]`, `[^a]`, `[!a]`)
//! and `\` escapes, matching the pattern language shared by key-value stores
//! and SQLite's `GLOB`.

/// Returns true when `text` matches the glob `pattern` in full.
pub fn glob_match(pattern: &str, text: &str) -> bool {
  let pattern: Vec<char> = pattern.chars().collect();
  let text: Vec<char> = text.chars().collect();

  let mut p = 0;
  let mut t = 0;
  // Pattern position after the last `*`, and the text position it resumes from.
  let mut backtrack: Option<(usize, usize)> = None;

  while t < text.len() {
    let next = if p < pattern.len() {
      match pattern[p] {
        '*' => {
          backtrack = Some((p + 1, t));
          p += 1;
          continue;
        }
        '?' => Some(p + 1),
        '[' => match_class(&pattern, p, text[t]),
        '\\' if p + 1 < pattern.len() => (pattern[p + 1] == text[t]).then_some(p + 2),
        c => (c == text[t]).then_some(p + 1),
      }
    } else {
      None
    };

    match (next, backtrack) {
      (Some(next), _) => {
        p = next;
        t += 1;
      }
      (None, Some((star_p, star_t))) => {
        p = star_p;
        t = star_t + 1;
        backtrack = Some((star_p, star_t + 1));
      }
      (None, None) => return false,
    }
  }

  while p < pattern.len() && pattern[p] == '*' {
    p += 1;
  }

  p == pattern.len()
}

/// Match `c` against the class opening at `pattern[open]`.
///
/// Returns the pattern position after the class when it matches. An
/// unterminated class is treated as a literal `[`.
fn match_class(pattern: &[char], open: usize, c: char) -> Option<usize> {
  let mut i = open + 1;
  let negated = matches!(pattern.get(i), Some('^') | Some('!'));
  if negated {
    i += 1;
  }

  let mut matched = false;
  let mut first = true;
  while i < pattern.len() && (first || pattern[i] != ']') {
    first = false;

    let mut lo = pattern[i];
    if lo == '\\' && i + 1 < pattern.len() {
      i += 1;
      lo = pattern[i];
    }

    if i + 2 < pattern.len() && pattern[i + 1] == '-' && pattern[i + 2] != ']' {
      let hi = pattern[i + 2];
      if lo <= c && c <= hi {
        matched = true;
      }
      i += 3;
    } else {
      if lo == c {
        matched = true;
      }
      i += 1;
    }
  }

  if i >= pattern.len() {
    return (c == '[').then_some(open + 1);
  }

  (matched != negated).then_some(i + 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_star_matches_suffix() {
    assert!(glob_match("taskue:runner:*", "taskue:runner:alpha"));
    assert!(glob_match("taskue:runner:*", "taskue:runner:"));
    assert!(!glob_match("taskue:runner:*", "taskue:task:alpha"));
  }

  #[test]
  fn test_star_in_middle_backtracks() {
    assert!(glob_match("a*b*c", "axxbyybzc"));
    assert!(!glob_match("a*b*c", "axxbyy"));
  }

  #[test]
  fn test_question_mark_matches_one_char() {
    assert!(glob_match("h?llo", "hello"));
    assert!(!glob_match("h?llo", "hllo"));
  }

  #[test]
  fn test_character_classes() {
    assert!(glob_match("h[ae]llo", "hallo"));
    assert!(!glob_match("h[ae]llo", "hillo"));
    assert!(glob_match("h[a-c]llo", "hbllo"));
    assert!(glob_match("h[^e]llo", "hallo"));
    assert!(!glob_match("h[!e]llo", "hello"));
  }

  #[test]
  fn test_escaped_metacharacters_are_literal() {
    assert!(glob_match("a\\*b", "a*b"));
    assert!(!glob_match("a\\*b", "axb"));
  }

  #[test]
  fn test_unterminated_class_is_literal() {
    assert!(glob_match("a[b", "a[b"));
    assert!(!glob_match("a[b", "ab"));
  }
}
