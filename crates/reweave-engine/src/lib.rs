/* crates/reweave-engine/src/lib.rs */

// Visual-edit rewrite engine: given coarse identifying info for one
// element in a component file plus a semantic change, find the exact
// node in a freshly parsed tree and re-emit the file with a minimal,
// span-local edit. Every call is self-contained; no tree or cache
// survives between requests.

mod classes;
mod error;
mod locate;
mod parse;
mod payload;
mod text;
mod translate;
mod verify;

#[cfg(test)]
mod tests;

// Re-exports for ergonomic use
pub use error::RewriteError;
pub use payload::{
  ClassUpdate, ElementInfo, SourcePosition, StyleChangeRequest, TextContentChangeRequest,
};
pub use translate::{translate, translate_styles};

/// Apply a semantic style change: translate every property to class
/// edits, locate the element, and rewrite its class attribute.
pub fn apply_style_change(
  source: &str,
  request: &StyleChangeRequest,
) -> Result<String, RewriteError> {
  let update = translate_styles(&request.styles);
  apply_class_update(source, &request.element, &update)
}

/// Apply an already-translated class update to the located element.
/// An empty update returns the source unchanged without parsing.
pub fn apply_class_update(
  source: &str,
  element: &ElementInfo,
  update: &ClassUpdate,
) -> Result<String, RewriteError> {
  if update.is_empty() {
    return Ok(source.to_string());
  }
  let tree = parse::parse(source)?;
  let node_id = locate::locate(&tree, element)?;
  match classes::rewrite_class_list(&tree, node_id, update)? {
    Some((span, replacement)) => {
      let output = verify::splice(source, span, &replacement);
      verify::verify_class_update(&output, update);
      Ok(output)
    }
    None => Ok(source.to_string()),
  }
}

/// Replace the located element's direct text content, leaving child
/// markup in place.
pub fn apply_text_change(
  source: &str,
  request: &TextContentChangeRequest,
) -> Result<String, RewriteError> {
  let tree = parse::parse(source)?;
  let node_id = locate::locate(&tree, &request.element)?;
  match text::rewrite_text_content(&tree, node_id, &request.text)? {
    Some((span, replacement)) => {
      let output = verify::splice(source, span, &replacement);
      verify::verify_text(&output, &request.text);
      Ok(output)
    }
    None => Ok(source.to_string()),
  }
}
