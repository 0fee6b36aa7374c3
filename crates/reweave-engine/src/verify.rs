/* crates/reweave-engine/src/verify.rs */

// Final stage: splice the local replacement back into the file and
// sanity-check the result. Verification never fails the call; a
// missing token is logged and the text returned anyway.

use crate::parse::Span;
use crate::payload::ClassUpdate;

/// Re-emit the file with one span replaced. Every byte outside the
/// span is carried through unchanged.
pub(crate) fn splice(source: &str, span: Span, replacement: &str) -> String {
  let mut out = String::with_capacity(source.len() - span.len() + replacement.len());
  out.push_str(&source[..span.start]);
  out.push_str(replacement);
  out.push_str(&source[span.end..]);
  out
}

/// Confirm every added class token landed in the output.
pub(crate) fn verify_class_update(output: &str, update: &ClassUpdate) {
  for token in &update.classes_to_add {
    if !output.contains(token.as_str()) {
      log::warn!("class token {token:?} missing from rewritten output");
    }
  }
}

/// Confirm the new text content landed in the output.
pub(crate) fn verify_text(output: &str, text: &str) {
  let trimmed = text.trim();
  if !trimmed.is_empty() && !output.contains(trimmed) {
    log::warn!("text content {trimmed:?} missing from rewritten output");
  }
}
