/* crates/reweave-engine/src/classes/rewrite.rs */

// Rewrites one element's class attribute across every authoring shape.
// Output is always a (span, replacement) pair local to the opening
// marker; the surrounding file is untouched.

use crate::error::RewriteError;
use crate::parse::{NodeId, Span, Tree};
use crate::payload::ClassUpdate;

use super::{ClassAttrShape, MergeArg, class_attr, classify, filter_tokens, split_tokens};

/// Compute the splice for a class update on the located element.
/// Returns None when the update is a no-op (nothing to add and nothing
/// present to remove).
pub(crate) fn rewrite_class_list(
  tree: &Tree<'_>,
  node_id: NodeId,
  update: &ClassUpdate,
) -> Result<Option<(Span, String)>, RewriteError> {
  let node = &tree.nodes[node_id];
  if node.tag.is_empty() {
    // Fragments have an opening marker but no attribute slot
    return Err(RewriteError::UnsupportedTarget { tag: "fragment".to_string() });
  }

  let Some(attr) = class_attr(node) else {
    return Ok(synthesize_attribute(tree, node_id, &update.classes_to_add));
  };
  let (Some(raw), Some(value_span)) = (attr.value.as_deref(), attr.value_span) else {
    // Bare `className` with no value: treat like a missing attribute
    return Ok(synthesize_attribute(tree, node_id, &update.classes_to_add));
  };

  let replacement = match classify(raw)? {
    ClassAttrShape::Literal { quote, value } => {
      format!("{quote}{}{quote}", updated_list(value, update))
    }
    ClassAttrShape::WrappedLiteral { quote, value } => {
      format!("{{{quote}{}{quote}}}", updated_list(value, update))
    }
    ClassAttrShape::MergeCall { callee, args } => rewrite_merge_call(callee, &args, update),
    // Dynamic shapes cannot be filtered safely: wrap the original
    // expression in a merge call and let runtime merging resolve it.
    // Remove patterns are not applied here — known limitation.
    ClassAttrShape::Template { template } => {
      if update.classes_to_add.is_empty() {
        return Ok(None);
      }
      format!("{{cn({template}, \"{}\")}}", update.classes_to_add.join(" "))
    }
    ClassAttrShape::Unknown { raw } => {
      if update.classes_to_add.is_empty() {
        return Ok(None);
      }
      let expr = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')).unwrap_or(raw).trim();
      format!("{{cn({expr}, \"{}\")}}", update.classes_to_add.join(" "))
    }
  };

  Ok(Some((value_span, replacement)))
}

/// Filter a literal token list and append the adds, idempotently.
fn updated_list(value: &str, update: &ClassUpdate) -> String {
  let mut tokens = filter_tokens(&split_tokens(value), &update.classes_to_remove);
  for add in &update.classes_to_add {
    if !tokens.contains(add) {
      tokens.push(add.clone());
    }
  }
  tokens.join(" ")
}

/// Splice `className="..."` right after the tag name, ahead of any
/// existing attributes, keeping a self-closing slash intact. Returns
/// None when there is nothing to add.
fn synthesize_attribute(
  tree: &Tree<'_>,
  node_id: NodeId,
  adds: &[String],
) -> Option<(Span, String)> {
  if adds.is_empty() {
    return None;
  }
  let node = &tree.nodes[node_id];
  let open = node.open_span.text(tree.source);
  let insert_at = 1 + node.tag.len(); // past '<' and the tag name
  let text =
    format!("{} className=\"{}\"{}", &open[..insert_at], adds.join(" "), &open[insert_at..]);
  Some((node.open_span, text))
}

/// Rebuild a merge call: literal-string arguments are filtered, the
/// first one with surviving tokens (or the first literal one at all)
/// receives the adds, and every non-string argument is copied through
/// byte-for-byte in its original order.
fn rewrite_merge_call(callee: &str, args: &[MergeArg<'_>], update: &ClassUpdate) -> String {
  // Pick the target literal argument before rebuilding
  let mut target: Option<usize> = None;
  let mut first_literal: Option<usize> = None;
  for (idx, arg) in args.iter().enumerate() {
    if let MergeArg::Str { value, .. } = arg {
      if first_literal.is_none() {
        first_literal = Some(idx);
      }
      if target.is_none() && !filter_tokens(&split_tokens(value), &update.classes_to_remove).is_empty()
      {
        target = Some(idx);
      }
    }
  }
  let target = target.or(first_literal);

  let mut out: Vec<String> = Vec::with_capacity(args.len() + 1);
  for (idx, arg) in args.iter().enumerate() {
    match arg {
      MergeArg::Str { quote, value } => {
        let mut tokens = filter_tokens(&split_tokens(value), &update.classes_to_remove);
        if target == Some(idx) {
          for add in &update.classes_to_add {
            if !tokens.contains(add) {
              tokens.push(add.clone());
            }
          }
        }
        out.push(format!("{quote}{}{quote}", tokens.join(" ")));
      }
      MergeArg::Template { raw } | MergeArg::Object { raw } | MergeArg::Other { raw } => {
        out.push((*raw).to_string());
      }
    }
  }
  // No literal argument anywhere: the adds need a home of their own
  if target.is_none() && !update.classes_to_add.is_empty() {
    out.insert(0, format!("\"{}\"", update.classes_to_add.join(" ")));
  }

  format!("{{{callee}({})}}", out.join(", "))
}
