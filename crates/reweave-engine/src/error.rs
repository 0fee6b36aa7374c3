/* crates/reweave-engine/src/error.rs */

use thiserror::Error;

/// Failures surfaced by one rewrite call. None are retried internally;
/// the caller either re-derives fresh element info from the live
/// preview or asks the user to reselect.
#[derive(Debug, Error)]
pub enum RewriteError {
  /// Malformed source text; `offset` is a byte offset into the input.
  #[error("parse error at byte {offset}: {message}")]
  Parse { offset: usize, message: String },

  /// Neither a position token nor any class tokens were supplied.
  #[error("no identifying information supplied for the selected element")]
  NoIdentifyingInfo,

  /// Identifying info was supplied but nothing in the tree matched
  /// well enough. Usually means the file changed under the selection.
  #[error("element not found; the source structure may have changed")]
  StructureChanged,

  /// The located node cannot receive this kind of edit, e.g. a class
  /// update on a fragment or a text update on a self-closing element.
  #[error("<{tag}> does not support this edit")]
  UnsupportedTarget { tag: String },

  /// A bracketed expression or merge-call argument list whose matching
  /// closer was not found within the scanned region.
  #[error("malformed expression in {context}")]
  MalformedExpression { context: String },
}

impl RewriteError {
  pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
    Self::Parse { offset, message: message.into() }
  }

  pub(crate) fn malformed(context: impl Into<String>) -> Self {
    Self::MalformedExpression { context: context.into() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_carries_offset() {
    let err = RewriteError::parse(42, "unclosed element");
    assert_eq!(err.to_string(), "parse error at byte 42: unclosed element");
  }

  #[test]
  fn locator_variants_are_distinguishable() {
    // Callers branch on these two to decide between "reselect" and "bug"
    assert!(!matches!(RewriteError::NoIdentifyingInfo, RewriteError::StructureChanged));
    let err = RewriteError::NoIdentifyingInfo;
    assert!(err.to_string().contains("no identifying information"));
  }

  #[test]
  fn unsupported_target_names_tag() {
    let err = RewriteError::UnsupportedTarget { tag: "img".to_string() };
    assert_eq!(err.to_string(), "<img> does not support this edit");
  }
}
