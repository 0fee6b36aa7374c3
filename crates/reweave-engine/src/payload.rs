/* crates/reweave-engine/src/payload.rs */

// Wire types delivered by the preview overlay, one per user action.
// Everything here is request-scoped; nothing outlives a rewrite call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifying payload for one selected element.
///
/// The display metadata fields (`current_styles`, `inline_styles`,
/// `bounding_box`) are carried through untouched — the engine ignores
/// them, but keeping them on the type lets callers round-trip the
/// payload without loss.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
  /// Precise position token, `fileTag:line:column`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub position: Option<String>,
  /// Class tokens currently observed on the element in the preview.
  #[serde(default)]
  pub classes: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub component_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text_content: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_styles: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inline_styles: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bounding_box: Option<Value>,
}

impl ElementInfo {
  /// Parsed position, or None when the token is absent or malformed.
  /// A token that does not parse is treated exactly like a missing one.
  pub fn source_position(&self) -> Option<SourcePosition> {
    self.position.as_deref().and_then(SourcePosition::parse)
  }
}

/// Parsed form of the position token. `line` is 1-based; `column` is
/// the character offset of the element's opening `<` on that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
  pub line: usize,
  pub column: usize,
}

impl SourcePosition {
  /// Parse `fileTag:line:column`. Exactly three colon-separated
  /// fields; line must be >= 1.
  pub fn parse(token: &str) -> Option<Self> {
    let mut parts = token.split(':');
    let _file_tag = parts.next()?;
    let line: usize = parts.next()?.parse().ok()?;
    let column: usize = parts.next()?.parse().ok()?;
    if parts.next().is_some() || line == 0 {
      return None;
    }
    Some(Self { line, column })
  }
}

/// Class tokens to add (order preserved on output) and patterns to
/// remove. A pattern matches a token by exact equality, by prefix, or
/// by equality after stripping the pattern's trailing hyphen — so
/// `"text-"` clears the whole `text-*` family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassUpdate {
  #[serde(default)]
  pub classes_to_add: Vec<String>,
  #[serde(default)]
  pub classes_to_remove: Vec<String>,
}

impl ClassUpdate {
  pub fn is_empty(&self) -> bool {
    self.classes_to_add.is_empty() && self.classes_to_remove.is_empty()
  }

  /// Fold another update into this one, keeping add order and
  /// deduplicating repeated tokens and patterns.
  pub fn merge(&mut self, other: ClassUpdate) {
    for token in other.classes_to_add {
      if !self.classes_to_add.contains(&token) {
        self.classes_to_add.push(token);
      }
    }
    for pattern in other.classes_to_remove {
      if !self.classes_to_remove.contains(&pattern) {
        self.classes_to_remove.push(pattern);
      }
    }
  }
}

/// Semantic style edit: property -> value, e.g. `color -> #0000ff`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleChangeRequest {
  pub element: ElementInfo,
  pub styles: BTreeMap<String, String>,
}

/// Literal replacement of an element's textual children.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContentChangeRequest {
  pub element: ElementInfo,
  pub text: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  // -- SourcePosition --

  #[test]
  fn position_parses_three_fields() {
    let pos = SourcePosition::parse("App.tsx:12:4").unwrap();
    assert_eq!(pos, SourcePosition { line: 12, column: 4 });
  }

  #[test]
  fn position_column_zero_is_valid() {
    let pos = SourcePosition::parse("page:3:0").unwrap();
    assert_eq!(pos.column, 0);
  }

  #[test]
  fn position_rejects_line_zero() {
    assert!(SourcePosition::parse("page:0:4").is_none());
  }

  #[test]
  fn position_rejects_wrong_arity() {
    assert!(SourcePosition::parse("page:12").is_none());
    assert!(SourcePosition::parse("page:12:4:9").is_none());
    assert!(SourcePosition::parse("").is_none());
  }

  #[test]
  fn position_rejects_non_numeric() {
    assert!(SourcePosition::parse("page:twelve:4").is_none());
    assert!(SourcePosition::parse("page:12:-4").is_none());
  }

  #[test]
  fn malformed_token_treated_as_absent() {
    let info = ElementInfo { position: Some("garbage".to_string()), ..Default::default() };
    assert!(info.source_position().is_none());
  }

  // -- ClassUpdate --

  #[test]
  fn merge_preserves_order_and_dedupes() {
    let mut update = ClassUpdate {
      classes_to_add: vec!["p-4".to_string()],
      classes_to_remove: vec!["p-".to_string()],
    };
    update.merge(ClassUpdate {
      classes_to_add: vec!["text-lg".to_string(), "p-4".to_string()],
      classes_to_remove: vec!["text-".to_string(), "p-".to_string()],
    });
    assert_eq!(update.classes_to_add, vec!["p-4", "text-lg"]);
    assert_eq!(update.classes_to_remove, vec!["p-", "text-"]);
  }

  // -- wire format --

  #[test]
  fn element_info_from_overlay_json() {
    let info: ElementInfo = serde_json::from_value(json!({
      "position": "Hero.tsx:8:6",
      "classes": ["btn", "btn-primary"],
      "componentName": "Button",
      "textContent": "Click me",
      "boundingBox": {"x": 0, "y": 0, "width": 120, "height": 40}
    }))
    .unwrap();
    assert_eq!(info.source_position(), Some(SourcePosition { line: 8, column: 6 }));
    assert_eq!(info.classes, vec!["btn", "btn-primary"]);
    assert_eq!(info.component_name.as_deref(), Some("Button"));
    assert!(info.bounding_box.is_some());
  }

  #[test]
  fn style_request_camel_case_fields() {
    let req: StyleChangeRequest = serde_json::from_value(json!({
      "element": {"classes": []},
      "styles": {"color": "#ff0000"}
    }))
    .unwrap();
    assert_eq!(req.styles.get("color").map(String::as_str), Some("#ff0000"));
  }
}
