/* crates/reweave-engine/src/text.rs */

// Replaces an element's direct text content while leaving every child
// element, expression, and comment in place. The splice is local to
// the element's inner span.

use crate::error::RewriteError;
use crate::parse::{NodeId, NodeKind, Span, Tree};

/// Compute the splice that sets the element's text content. The first
/// non-whitespace text child is replaced, later ones are dropped, and
/// an element with no text children gets the new text prepended ahead
/// of its markup children. Whitespace-only runs survive untouched so
/// the surrounding formatting does.
pub(crate) fn rewrite_text_content(
  tree: &Tree<'_>,
  node_id: NodeId,
  text: &str,
) -> Result<Option<(Span, String)>, RewriteError> {
  let node = &tree.nodes[node_id];
  let Some(inner_span) = node.inner_span else {
    // Self-closing elements have no content slot to rewrite
    return Err(RewriteError::UnsupportedTarget { tag: node.tag.clone() });
  };

  let replacement = padded(text);
  let mut out = String::with_capacity(inner_span.len() + replacement.len());
  let mut placed = false;

  for &child_id in &node.children {
    let child = &tree.nodes[child_id];
    let raw = child.span.text(tree.source);
    match child.kind {
      NodeKind::Text if !raw.trim().is_empty() => {
        if !placed {
          out.push_str(&replacement);
          placed = true;
        }
      }
      _ => out.push_str(raw),
    }
  }
  if !placed && !replacement.is_empty() {
    out.insert_str(0, &replacement);
  }

  let current = inner_span.text(tree.source);
  if out == current {
    return Ok(None);
  }
  Ok(Some((inner_span, out)))
}

/// Single-space padding keeps the new text from fusing with adjacent
/// markup when the source had separating whitespace inside the node.
fn padded(text: &str) -> String {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    String::new()
  } else {
    format!(" {trimmed} ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse::parse;

  fn apply(source: &str, text: &str) -> String {
    let tree = parse(source).unwrap();
    let id = tree.markup_nodes().next().unwrap();
    match rewrite_text_content(&tree, id, text).unwrap() {
      Some((span, replacement)) => {
        let mut out = String::with_capacity(source.len());
        out.push_str(&source[..span.start]);
        out.push_str(&replacement);
        out.push_str(&source[span.end..]);
        out
      }
      None => source.to_string(),
    }
  }

  #[test]
  fn plain_text_replaced() {
    assert_eq!(apply("<p>Old text</p>", "New text"), "<p> New text </p>");
  }

  #[test]
  fn child_elements_survive() {
    assert_eq!(apply("<div>Old text<Icon/></div>", "New text"), "<div> New text <Icon/></div>");
  }

  #[test]
  fn expressions_survive() {
    assert_eq!(apply("<p>Hello {name}!</p>", "Bye"), "<p> Bye {name}</p>");
  }

  #[test]
  fn later_text_runs_dropped() {
    assert_eq!(apply("<div>a<b>x</b>c</div>", "z"), "<div> z <b>x</b></div>");
  }

  #[test]
  fn element_without_text_gets_prepended() {
    assert_eq!(apply("<div><Icon/></div>", "Label"), "<div> Label <Icon/></div>");
  }

  #[test]
  fn whitespace_only_runs_kept_as_formatting() {
    let src = "<div>\n  <span>Old</span>\n</div>";
    let tree = parse(src).unwrap();
    let outer = tree.markup_nodes().next().unwrap();
    let span_id = tree.nodes[outer].children.iter().copied()
      .find(|&c| tree.nodes[c].tag == "span")
      .unwrap();
    let (span, replacement) = rewrite_text_content(&tree, span_id, "New").unwrap().unwrap();
    let out = format!("{}{}{}", &src[..span.start], replacement, &src[span.end..]);
    // The indentation around <span> is untouched
    assert_eq!(out, "<div>\n  <span> New </span>\n</div>");
  }

  #[test]
  fn empty_text_clears_content() {
    assert_eq!(apply("<p>gone</p>", ""), "<p></p>");
  }

  #[test]
  fn identical_content_is_noop() {
    let src = "<p> same </p>";
    assert_eq!(apply(src, "same"), src);
  }

  #[test]
  fn self_closing_target_rejected() {
    let tree = parse("<Spacer />").unwrap();
    let id = tree.markup_nodes().next().unwrap();
    let err = rewrite_text_content(&tree, id, "x").unwrap_err();
    assert!(matches!(err, RewriteError::UnsupportedTarget { tag } if tag == "Spacer"));
  }

  #[test]
  fn fragment_content_allowed() {
    assert_eq!(apply("<>old</>", "new"), "<> new </>");
  }
}
