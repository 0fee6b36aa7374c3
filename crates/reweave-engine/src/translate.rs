/* crates/reweave-engine/src/translate.rs */

// Pure translation from semantic style properties to utility-class
// edits. Each property maps to (tokens to add, patterns to remove);
// numeric values snap to fixed step tables, anything off-table falls
// back to an arbitrary-value token embedding the raw value.

use std::collections::BTreeMap;

use crate::payload::ClassUpdate;

const SPACING_STEPS: &[(f64, &str)] = &[
  (0.0, "0"),
  (4.0, "1"),
  (8.0, "2"),
  (12.0, "3"),
  (16.0, "4"),
  (20.0, "5"),
  (24.0, "6"),
  (32.0, "8"),
  (40.0, "10"),
  (48.0, "12"),
];

const RADIUS_STEPS: &[(f64, &str)] = &[
  (0.0, "rounded-none"),
  (4.0, "rounded"),
  (6.0, "rounded-md"),
  (8.0, "rounded-lg"),
  (12.0, "rounded-xl"),
  (16.0, "rounded-2xl"),
  (24.0, "rounded-3xl"),
  (32.0, "rounded-[32px]"),
];

const FONT_SIZES: &[(f64, &str)] = &[
  (12.0, "text-xs"),
  (14.0, "text-sm"),
  (16.0, "text-base"),
  (18.0, "text-lg"),
  (20.0, "text-xl"),
  (24.0, "text-2xl"),
  (30.0, "text-3xl"),
  (36.0, "text-4xl"),
  (48.0, "text-5xl"),
];

const FONT_WEIGHTS: &[(&str, &str)] = &[
  ("100", "font-thin"),
  ("200", "font-extralight"),
  ("300", "font-light"),
  ("400", "font-normal"),
  ("normal", "font-normal"),
  ("500", "font-medium"),
  ("600", "font-semibold"),
  ("700", "font-bold"),
  ("bold", "font-bold"),
  ("800", "font-extrabold"),
  ("900", "font-black"),
];

const FONT_WEIGHT_TOKENS: &[&str] = &[
  "font-thin",
  "font-extralight",
  "font-light",
  "font-normal",
  "font-medium",
  "font-semibold",
  "font-bold",
  "font-extrabold",
  "font-black",
];

const DISPLAY_TOKENS: &[(&str, &str)] = &[
  ("flex", "flex"),
  ("inline-flex", "inline-flex"),
  ("grid", "grid"),
  ("block", "block"),
  ("inline-block", "inline-block"),
  ("inline", "inline"),
  ("none", "hidden"),
];

/// Translate one property/value pair into a class update. Unknown
/// properties produce an arbitrary-property token so no edit is ever
/// dropped on the floor.
pub fn translate(property: &str, value: &str) -> ClassUpdate {
  let value = value.trim();
  let (adds, removes): (Vec<String>, Vec<String>) = match property {
    "color" => (vec![family_or_arbitrary(value, "text-")], vec!["text-".into()]),
    "background-color" | "backgroundColor" => {
      (vec![family_or_arbitrary(value, "bg-")], vec!["bg-".into()])
    }
    "font-size" | "fontSize" => (vec![font_size_token(value)], vec!["text-".into()]),
    "font-weight" | "fontWeight" => (
      vec![font_weight_token(value)],
      FONT_WEIGHT_TOKENS.iter().map(|t| (*t).to_string()).collect(),
    ),
    "text-align" | "textAlign" => (
      vec![format!("text-{value}")],
      vec!["text-left".into(), "text-center".into(), "text-right".into(), "text-justify".into()],
    ),
    "border-radius" | "borderRadius" => (vec![radius_token(value)], vec!["rounded".into()]),
    "opacity" => (vec![opacity_token(value)], vec!["opacity-".into()]),
    // Aggregate spacing clears every directional override too
    "padding" => (vec![spacing_token(value, "p")], spacing_removes("p")),
    "padding-top" | "paddingTop" => (vec![spacing_token(value, "pt")], vec!["pt-".into()]),
    "padding-bottom" | "paddingBottom" => (vec![spacing_token(value, "pb")], vec!["pb-".into()]),
    "padding-left" | "paddingLeft" => (vec![spacing_token(value, "pl")], vec!["pl-".into()]),
    "padding-right" | "paddingRight" => (vec![spacing_token(value, "pr")], vec!["pr-".into()]),
    "margin" => (vec![spacing_token(value, "m")], spacing_removes("m")),
    "margin-top" | "marginTop" => (vec![spacing_token(value, "mt")], vec!["mt-".into()]),
    "margin-bottom" | "marginBottom" => (vec![spacing_token(value, "mb")], vec!["mb-".into()]),
    "margin-left" | "marginLeft" => (vec![spacing_token(value, "ml")], vec!["ml-".into()]),
    "margin-right" | "marginRight" => (vec![spacing_token(value, "mr")], vec!["mr-".into()]),
    "gap" => (vec![spacing_token(value, "gap")], vec!["gap-".into()]),
    "width" => (vec![size_token(value, "w")], vec!["w-".into()]),
    "height" => (vec![size_token(value, "h")], vec!["h-".into()]),
    "display" => (
      vec![display_token(value)],
      DISPLAY_TOKENS.iter().map(|(_, t)| (*t).to_string()).collect(),
    ),
    "flex-direction" | "flexDirection" => (
      vec![flex_direction_token(value)],
      vec!["flex-row".into(), "flex-col".into()],
    ),
    "align-items" | "alignItems" => {
      (vec![format!("items-{}", strip_flex(value))], vec!["items-".into()])
    }
    "justify-content" | "justifyContent" => {
      (vec![format!("justify-{}", justify_suffix(value))], vec!["justify-".into()])
    }
    other => {
      let prop = other.trim();
      (
        vec![format!("[{prop}:{}]", value.replace(' ', "_"))],
        vec![format!("[{prop}:")],
      )
    }
  };

  ClassUpdate { classes_to_add: adds, classes_to_remove: removes }
}

/// Fold a whole property map into one update, in key order.
pub fn translate_styles(styles: &BTreeMap<String, String>) -> ClassUpdate {
  let mut update = ClassUpdate::default();
  for (property, value) in styles {
    update.merge(translate(property, value));
  }
  update
}

/// Values that already look like a class of the expected family pass
/// through unchanged.
fn family_or_arbitrary(value: &str, prefix: &str) -> String {
  if value.starts_with(prefix) {
    value.to_string()
  } else {
    format!("{prefix}[{value}]")
  }
}

fn spacing_removes(stem: &str) -> Vec<String> {
  vec![
    format!("{stem}-"),
    format!("{stem}x-"),
    format!("{stem}y-"),
    format!("{stem}t-"),
    format!("{stem}b-"),
    format!("{stem}l-"),
    format!("{stem}r-"),
  ]
}

/// Parse a CSS length into pixels. Accepts `16px`, bare `16`, and
/// `1rem` (at the 16px root size).
fn parse_px(value: &str) -> Option<f64> {
  if let Some(rem) = value.strip_suffix("rem") {
    return rem.trim().parse::<f64>().ok().map(|v| v * 16.0);
  }
  let raw = value.strip_suffix("px").unwrap_or(value).trim();
  raw.parse().ok()
}

fn spacing_token(value: &str, stem: &str) -> String {
  let prefix = format!("{stem}-");
  if value.starts_with(&prefix) {
    return value.to_string();
  }
  match parse_px(value) {
    Some(px) if px >= 0.0 => {
      for (threshold, step) in SPACING_STEPS {
        if px <= *threshold {
          return format!("{stem}-{step}");
        }
      }
      format!("{stem}-[{value}]")
    }
    _ => format!("{stem}-[{value}]"),
  }
}

fn radius_token(value: &str) -> String {
  if value.starts_with("rounded") {
    return value.to_string();
  }
  if value == "9999px" || value == "50%" {
    return "rounded-full".to_string();
  }
  match parse_px(value) {
    Some(px) if px >= 0.0 => {
      for (threshold, token) in RADIUS_STEPS {
        if px <= *threshold {
          return (*token).to_string();
        }
      }
      format!("rounded-[{value}]")
    }
    _ => format!("rounded-[{value}]"),
  }
}

/// Snap to the nearest multiple of 5 in the 0..=100 percentage table.
fn opacity_token(value: &str) -> String {
  if value.starts_with("opacity-") {
    return value.to_string();
  }
  let pct = if let Some(p) = value.strip_suffix('%') {
    p.trim().parse::<f64>().ok()
  } else {
    value.parse::<f64>().ok().map(|v| if v <= 1.0 { v * 100.0 } else { v })
  };
  match pct {
    Some(p) => {
      let snapped = ((p / 5.0).round() * 5.0).clamp(0.0, 100.0) as u32;
      format!("opacity-{snapped}")
    }
    None => format!("opacity-[{value}]"),
  }
}

fn font_size_token(value: &str) -> String {
  if value.starts_with("text-") {
    return value.to_string();
  }
  if let Some(px) = parse_px(value) {
    for (size, token) in FONT_SIZES {
      if (px - size).abs() < f64::EPSILON {
        return (*token).to_string();
      }
    }
  }
  format!("text-[{value}]")
}

fn font_weight_token(value: &str) -> String {
  if value.starts_with("font-") {
    return value.to_string();
  }
  for (key, token) in FONT_WEIGHTS {
    if *key == value {
      return (*token).to_string();
    }
  }
  format!("font-[{value}]")
}

/// Width/height share the spacing scale but add sizing keywords.
fn size_token(value: &str, stem: &str) -> String {
  let prefix = format!("{stem}-");
  if value.starts_with(&prefix) {
    return value.to_string();
  }
  match value {
    "100%" => return format!("{stem}-full"),
    "auto" => return format!("{stem}-auto"),
    "100vw" | "100vh" => return format!("{stem}-screen"),
    _ => {}
  }
  spacing_token(value, stem)
}

fn display_token(value: &str) -> String {
  for (key, token) in DISPLAY_TOKENS {
    if *key == value {
      return (*token).to_string();
    }
  }
  format!("[display:{value}]")
}

fn flex_direction_token(value: &str) -> String {
  match value {
    "row" => "flex-row".to_string(),
    "row-reverse" => "flex-row-reverse".to_string(),
    "column" => "flex-col".to_string(),
    "column-reverse" => "flex-col-reverse".to_string(),
    other => format!("flex-[{other}]"),
  }
}

/// `flex-start` / `flex-end` lose their prefix in utility vocabulary.
fn strip_flex(value: &str) -> &str {
  value.strip_prefix("flex-").unwrap_or(value)
}

fn justify_suffix(value: &str) -> String {
  match value {
    "space-between" => "between".to_string(),
    "space-around" => "around".to_string(),
    "space-evenly" => "evenly".to_string(),
    other => strip_flex(other).to_string(),
  }
}
