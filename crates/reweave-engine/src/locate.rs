/* crates/reweave-engine/src/locate.rs */

// Two strategies, first success wins: exact position-token resolution,
// then fuzzy class-overlap matching for when the position went stale.
// Locating never guesses below the acceptance threshold — a bad patch
// is worse than asking the user to reselect.

use std::collections::HashSet;

use crate::classes::observed_tokens;
use crate::error::RewriteError;
use crate::parse::{NodeId, Tree};
use crate::payload::{ElementInfo, SourcePosition};

/// Minimum share of the target's class tokens an element must carry
/// for the fuzzy fallback to accept it.
const OVERLAP_THRESHOLD: f64 = 0.70;

/// Resolve the identifying payload to exactly one markup node.
pub(crate) fn locate(tree: &Tree<'_>, info: &ElementInfo) -> Result<NodeId, RewriteError> {
  let position = info.source_position();

  if let Some(pos) = position
    && let Some(id) = locate_by_position(tree, pos)
  {
    return Ok(id);
  }

  if !info.classes.is_empty()
    && let Some(id) = locate_by_class_overlap(tree, &info.classes)
  {
    return Ok(id);
  }

  if position.is_none() && info.classes.is_empty() {
    Err(RewriteError::NoIdentifyingInfo)
  } else {
    Err(RewriteError::StructureChanged)
  }
}

/// Convert (line, column) to an absolute character offset, find the
/// deepest node containing it, and ascend parent links to the nearest
/// element or fragment. Out-of-range positions fail silently so the
/// class-overlap fallback gets its turn.
fn locate_by_position(tree: &Tree<'_>, pos: SourcePosition) -> Option<NodeId> {
  let offset = position_to_offset(tree.source, pos)?;

  let deepest = (0..tree.nodes.len())
    .filter(|&id| tree.nodes[id].span.contains(offset))
    .min_by_key(|&id| tree.nodes[id].span.len())?;

  let mut current = deepest;
  loop {
    if tree.nodes[current].kind.is_markup() {
      return Some(current);
    }
    current = tree.nodes[current].parent?;
  }
}

fn position_to_offset(source: &str, pos: SourcePosition) -> Option<usize> {
  let mut offset = 0;
  for (idx, line) in source.split('\n').enumerate() {
    if idx + 1 == pos.line {
      // A column past the line's end is stale, not a pointer into the
      // next line
      return (pos.column < line.len()).then(|| offset + pos.column);
    }
    offset += line.len() + 1; // line plus its separator
  }
  None
}

/// Best-overlap scan over every element and self-closing element.
/// Strictly greater ratio replaces the best; ties keep the earlier
/// node in document order.
fn locate_by_class_overlap(tree: &Tree<'_>, target: &[String]) -> Option<NodeId> {
  let target_set: HashSet<&str> = target.iter().map(String::as_str).collect();
  if target_set.is_empty() {
    return None;
  }

  let mut best: Option<(NodeId, f64)> = None;
  for id in tree.markup_nodes() {
    let node = &tree.nodes[id];
    if node.tag.is_empty() {
      continue; // fragments carry no classes
    }
    let observed: HashSet<String> = observed_tokens(node).into_iter().collect();
    let matched = observed.iter().filter(|t| target_set.contains(t.as_str())).count();
    let ratio = matched as f64 / target_set.len() as f64;
    if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
      best = Some((id, ratio));
    }
  }

  let (id, ratio) = best?;
  log::debug!("class-overlap best candidate <{}> ratio {ratio:.2}", tree.nodes[id].tag);
  (ratio >= OVERLAP_THRESHOLD).then_some(id)
}
