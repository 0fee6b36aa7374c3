/* crates/reweave-engine/src/classes/mod.rs */

// The class attribute shows up in many authoring shapes — plain
// string, wrapped string, template literal, cn(...) merge call, object
// conditionals. One closed variant set covers them all, with a single
// extraction function per variant, so both the locator's fallback and
// the rewriter stay exhaustive.

mod rewrite;

pub(crate) use rewrite::rewrite_class_list;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::RewriteError;
use crate::parse::{Attr, Node};

fn token_run_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  // Alphanumeric / hyphen / underscore runs — the loose class-token
  // alphabet used for best-effort extraction from dynamic text
  RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap())
}

fn quoted_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).unwrap())
}

/// The class attribute on an element, `className` taking precedence
/// over `class`.
pub(crate) fn class_attr(node: &Node) -> Option<&Attr> {
  node.attr("className").or_else(|| node.attr("class"))
}

/// Value shapes the class attribute is authored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClassAttrShape<'a> {
  /// `className="a b"` — value without quotes.
  Literal { quote: char, value: &'a str },
  /// `className={"a b"}` — a braced expression holding one string.
  WrappedLiteral { quote: char, value: &'a str },
  /// `` className={`a ${x} b`} `` — backtick text including backticks.
  Template { template: &'a str },
  /// `className={cn("a", cond && "b", { active })}`.
  MergeCall { callee: &'a str, args: Vec<MergeArg<'a>> },
  /// Anything else — raw expression text including braces.
  Unknown { raw: &'a str },
}

/// One top-level argument of a merge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MergeArg<'a> {
  Str { quote: char, value: &'a str },
  Template { raw: &'a str },
  Object { raw: &'a str },
  Other { raw: &'a str },
}

/// Classify a raw attribute value (text including quotes or braces).
pub(crate) fn classify(raw: &str) -> Result<ClassAttrShape<'_>, RewriteError> {
  if let Some(rest) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
    return Ok(ClassAttrShape::Literal { quote: '"', value: rest });
  }
  if let Some(rest) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
    return Ok(ClassAttrShape::Literal { quote: '\'', value: rest });
  }

  let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) else {
    return Ok(ClassAttrShape::Unknown { raw });
  };
  let expr = inner.trim();

  if let Some(value) = single_string_literal(expr, '"') {
    return Ok(ClassAttrShape::WrappedLiteral { quote: '"', value });
  }
  if let Some(value) = single_string_literal(expr, '\'') {
    return Ok(ClassAttrShape::WrappedLiteral { quote: '\'', value });
  }
  if expr.starts_with('`') && expr.ends_with('`') && expr.len() >= 2 {
    return Ok(ClassAttrShape::Template { template: expr });
  }
  if let Some((callee, args_src)) = merge_call_parts(expr)? {
    let args = split_args(args_src)?.into_iter().map(classify_arg).collect();
    return Ok(ClassAttrShape::MergeCall { callee, args });
  }

  Ok(ClassAttrShape::Unknown { raw })
}

/// `expr` when it is exactly one string literal in the given quote.
fn single_string_literal(expr: &str, quote: char) -> Option<&str> {
  let rest = expr.strip_prefix(quote)?.strip_suffix(quote)?;
  if rest.contains(quote) { None } else { Some(rest) }
}

/// Split `cn(...)` / `utils.cn(...)` into callee and argument text.
/// Returns None when the expression is not a recognized merge call or
/// only begins with one (`cn("a") + rest` stays an Unknown shape); a
/// recognized call missing its closing paren is a malformed
/// expression.
fn merge_call_parts(expr: &str) -> Result<Option<(&str, &str)>, RewriteError> {
  let bytes = expr.as_bytes();
  let mut i = 0;
  while i < bytes.len()
    && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'$' | b'.'))
  {
    i += 1;
  }
  if i == 0 || bytes.get(i) != Some(&b'(') {
    return Ok(None);
  }
  let callee = &expr[..i];
  if callee != "cn" && !callee.ends_with(".cn") {
    return Ok(None);
  }
  let Some(close) = matching_paren(bytes, i) else {
    return Err(RewriteError::malformed(format!("{callee}(...) call")));
  };
  if close + 1 != expr.len() {
    // The call is only a prefix of a larger expression
    return Ok(None);
  }
  Ok(Some((callee, &expr[i + 1..close])))
}

/// Index of the `)` matching the `(` at `open`, tracking nested
/// brackets and strings. None when no balanced closer exists.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
  let mut depth = 0usize;
  let mut i = open;
  while i < bytes.len() {
    match bytes[i] {
      b'(' | b'[' | b'{' => depth += 1,
      b')' | b']' | b'}' => {
        depth -= 1;
        if depth == 0 {
          return (bytes[i] == b')').then_some(i);
        }
      }
      q @ (b'"' | b'\'' | b'`') => {
        i += 1;
        while i < bytes.len() && bytes[i] != q {
          if bytes[i] == b'\\' {
            i += 1;
          }
          i += 1;
        }
        if i >= bytes.len() {
          return None;
        }
      }
      _ => {}
    }
    i += 1;
  }
  None
}

/// Split argument text on top-level commas, tracking parens, brackets,
/// braces, strings and templates.
fn split_args(src: &str) -> Result<Vec<&str>, RewriteError> {
  let bytes = src.as_bytes();
  let mut args = Vec::new();
  let mut depth = 0i32;
  let mut start = 0;
  let mut i = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'(' | b'[' | b'{' => {
        depth += 1;
        i += 1;
      }
      b')' | b']' | b'}' => {
        depth -= 1;
        if depth < 0 {
          return Err(RewriteError::malformed("merge call arguments"));
        }
        i += 1;
      }
      q @ (b'"' | b'\'' | b'`') => {
        i += 1;
        while i < bytes.len() && bytes[i] != q {
          if bytes[i] == b'\\' {
            i += 1;
          }
          i += 1;
        }
        if i >= bytes.len() {
          return Err(RewriteError::malformed("string in merge call"));
        }
        i += 1;
      }
      b',' if depth == 0 => {
        args.push(src[start..i].trim());
        i += 1;
        start = i;
      }
      _ => i += 1,
    }
  }
  if depth != 0 {
    return Err(RewriteError::malformed("merge call arguments"));
  }
  let last = src[start..].trim();
  if !last.is_empty() {
    args.push(last);
  }
  Ok(args)
}

fn classify_arg(arg: &str) -> MergeArg<'_> {
  if let Some(value) = single_string_literal(arg, '"') {
    return MergeArg::Str { quote: '"', value };
  }
  if let Some(value) = single_string_literal(arg, '\'') {
    return MergeArg::Str { quote: '\'', value };
  }
  if arg.starts_with('`') && arg.ends_with('`') && arg.len() >= 2 {
    return MergeArg::Template { raw: arg };
  }
  if arg.starts_with('{') && arg.ends_with('}') {
    return MergeArg::Object { raw: arg };
  }
  MergeArg::Other { raw: arg }
}

/// Extract the class tokens a shape currently carries. Template and
/// Unknown extraction is best-effort by design: dynamic hole content
/// is included, which can over-report tokens.
pub(crate) fn extract_tokens(shape: &ClassAttrShape<'_>) -> Vec<String> {
  match shape {
    ClassAttrShape::Literal { value, .. } | ClassAttrShape::WrappedLiteral { value, .. } => {
      split_tokens(value)
    }
    ClassAttrShape::Template { template } => token_runs(template),
    ClassAttrShape::MergeCall { args, .. } => {
      let mut tokens = Vec::new();
      for arg in args {
        match arg {
          MergeArg::Str { value, .. } => push_unique(&mut tokens, split_tokens(value)),
          MergeArg::Template { raw } => push_unique(&mut tokens, token_runs(raw)),
          MergeArg::Object { raw } => push_unique(&mut tokens, object_keys(raw)),
          // Conditionals like `active && "is-on"` still reveal their
          // string payloads to the fuzzy matcher
          MergeArg::Other { raw } => push_unique(&mut tokens, quoted_tokens(raw)),
        }
      }
      tokens
    }
    ClassAttrShape::Unknown { raw } => quoted_tokens(raw),
  }
}

/// Tokens observed on a node's class attribute; empty when absent.
pub(crate) fn observed_tokens(node: &Node) -> Vec<String> {
  let Some(raw) = class_attr(node).and_then(|a| a.value.as_deref()) else {
    return Vec::new();
  };
  match classify(raw) {
    Ok(shape) => extract_tokens(&shape),
    // Malformed attribute text still participates in fuzzy matching
    Err(_) => {
      let mut tokens = Vec::new();
      push_unique(&mut tokens, token_runs(raw));
      tokens
    }
  }
}

pub(crate) fn split_tokens(value: &str) -> Vec<String> {
  value.split_whitespace().map(str::to_string).collect()
}

fn token_runs(text: &str) -> Vec<String> {
  token_run_re().find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Whitespace-split tokens from every quoted substring, deduped.
fn quoted_tokens(text: &str) -> Vec<String> {
  let mut tokens = Vec::new();
  for cap in quoted_re().captures_iter(text) {
    let inner = cap.get(1).or_else(|| cap.get(2)).map_or("", |m| m.as_str());
    push_unique(&mut tokens, split_tokens(inner));
  }
  tokens
}

/// Top-level object-literal property keys, quotes stripped. Each key
/// names one conditional class.
fn object_keys(raw: &str) -> Vec<String> {
  let inner = raw.trim_start_matches('{').trim_end_matches('}');
  let Ok(entries) = split_args(inner) else {
    return Vec::new();
  };
  let mut keys = Vec::new();
  for entry in entries {
    let key = entry.split(':').next().unwrap_or(entry).trim();
    let key = key.trim_matches(|c| c == '"' || c == '\'');
    if !key.is_empty() {
      keys.push(key.to_string());
    }
  }
  keys
}

fn push_unique(tokens: &mut Vec<String>, extra: Vec<String>) {
  for token in extra {
    if !tokens.contains(&token) {
      tokens.push(token);
    }
  }
}

/// A remove pattern matches by exact equality, by prefix, or by the
/// pattern with its trailing hyphen stripped — `"text-"` removes
/// `text-red-500`, `text-lg`, and a bare `text`.
pub(crate) fn matches_remove_pattern(token: &str, pattern: &str) -> bool {
  token == pattern
    || token.starts_with(pattern)
    || pattern.strip_suffix('-').is_some_and(|stripped| token == stripped)
}

pub(crate) fn filter_tokens(tokens: &[String], patterns: &[String]) -> Vec<String> {
  tokens
    .iter()
    .filter(|token| !patterns.iter().any(|p| matches_remove_pattern(token, p)))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tokens(raw: &str) -> Vec<String> {
    extract_tokens(&classify(raw).unwrap())
  }

  // -- classify --

  #[test]
  fn classify_literal() {
    assert_eq!(classify(r#""a b""#).unwrap(), ClassAttrShape::Literal { quote: '"', value: "a b" });
  }

  #[test]
  fn classify_wrapped_literal() {
    assert_eq!(
      classify(r#"{"a b"}"#).unwrap(),
      ClassAttrShape::WrappedLiteral { quote: '"', value: "a b" }
    );
    assert_eq!(
      classify("{'a b'}").unwrap(),
      ClassAttrShape::WrappedLiteral { quote: '\'', value: "a b" }
    );
  }

  #[test]
  fn classify_template() {
    let shape = classify("{`base ${x}`}").unwrap();
    assert_eq!(shape, ClassAttrShape::Template { template: "`base ${x}`" });
  }

  #[test]
  fn classify_merge_call() {
    let shape = classify(r#"{cn("a", cond && "b")}"#).unwrap();
    match shape {
      ClassAttrShape::MergeCall { callee, args } => {
        assert_eq!(callee, "cn");
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], MergeArg::Str { quote: '"', value: "a" });
        assert_eq!(args[1], MergeArg::Other { raw: r#"cond && "b""# });
      }
      other => panic!("expected MergeCall, got {other:?}"),
    }
  }

  #[test]
  fn classify_member_merge_call() {
    let shape = classify(r#"{utils.cn("a")}"#).unwrap();
    assert!(matches!(shape, ClassAttrShape::MergeCall { callee: "utils.cn", .. }));
  }

  #[test]
  fn classify_non_cn_call_is_unknown() {
    assert!(matches!(classify("{clsx(\"a\")}").unwrap(), ClassAttrShape::Unknown { .. }));
  }

  #[test]
  fn classify_unterminated_merge_call_is_malformed() {
    let err = classify(r#"{cn("a"}"#).unwrap_err();
    assert!(matches!(err, RewriteError::MalformedExpression { .. }), "got {err:?}");
  }

  #[test]
  fn classify_call_with_trailing_content_is_unknown() {
    // Valid compound expression, not a bare merge call
    let shape = classify(r#"{cn("a") + " more"}"#).unwrap();
    assert!(matches!(shape, ClassAttrShape::Unknown { .. }), "got {shape:?}");
  }

  #[test]
  fn classify_identifier_is_unknown() {
    assert!(matches!(classify("{styles.root}").unwrap(), ClassAttrShape::Unknown { .. }));
  }

  // -- extraction --

  #[test]
  fn extract_literal_splits_whitespace() {
    assert_eq!(tokens(r#""btn  btn-primary""#), vec!["btn", "btn-primary"]);
  }

  #[test]
  fn extract_template_includes_hole_content() {
    // Over-reporting from dynamic holes is intentional
    assert_eq!(tokens("{`base ${variant}`}"), vec!["base", "variant"]);
  }

  #[test]
  fn extract_merge_call_union() {
    let raw = r#"{cn("btn btn-lg", `extra ${size}`, { active: isOn, "is-open": open })}"#;
    let got = tokens(raw);
    for expected in ["btn", "btn-lg", "extra", "size", "active", "is-open"] {
      assert!(got.contains(&expected.to_string()), "missing {expected} in {got:?}");
    }
  }

  #[test]
  fn extract_unknown_scans_quoted_substrings() {
    assert_eq!(tokens(r#"{cond ? "a b" : 'c'}"#), vec!["a", "b", "c"]);
  }

  #[test]
  fn extract_merge_call_reads_conditional_strings() {
    assert_eq!(tokens(r#"{cn("a", someVar)}"#), vec!["a"]);
    assert_eq!(tokens(r#"{cn("a", isOn && "b c")}"#), vec!["a", "b", "c"]);
  }

  // -- split_args --

  #[test]
  fn split_args_respects_nesting() {
    let args = split_args(r#""a", fn(x, y), { k: v, j: w }, [1, 2]"#).unwrap();
    assert_eq!(args, vec![r#""a""#, "fn(x, y)", "{ k: v, j: w }", "[1, 2]"]);
  }

  #[test]
  fn split_args_respects_strings() {
    let args = split_args(r#""a, b", 'c, d'"#).unwrap();
    assert_eq!(args, vec![r#""a, b""#, "'c, d'"]);
  }

  #[test]
  fn split_args_trailing_comma() {
    assert_eq!(split_args(r#""a","#).unwrap(), vec![r#""a""#]);
  }

  // -- remove patterns --

  #[test]
  fn pattern_exact_match() {
    assert!(matches_remove_pattern("btn", "btn"));
    assert!(!matches_remove_pattern("button", "btnx"));
  }

  #[test]
  fn pattern_prefix_clears_family() {
    assert!(matches_remove_pattern("text-red-500", "text-"));
    assert!(matches_remove_pattern("text-lg", "text-"));
    assert!(!matches_remove_pattern("font-bold", "text-"));
  }

  #[test]
  fn pattern_hyphen_stripped_exact() {
    assert!(matches_remove_pattern("rounded", "rounded-"));
  }

  #[test]
  fn filter_clears_family() {
    let tokens: Vec<String> =
      ["text-red-500", "text-lg", "font-bold"].iter().map(|s| s.to_string()).collect();
    assert_eq!(filter_tokens(&tokens, &["text-".to_string()]), vec!["font-bold"]);
  }
}
