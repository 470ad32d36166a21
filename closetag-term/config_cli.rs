//! `closetag config` helpers.

use anyhow::{
  Result,
  bail,
};
use closetag_lib::{
  Configuration,
  CursorPlacement,
  ExcludedTags,
};

pub const KEYS: &[&str] = &[
  "excluded-tags",
  "cursor-placement",
  "skip-fenced-code-blocks",
  "skip-inline-code-spans",
];

/// Sets one option by its config-file key.
pub fn set_option(config: &mut Configuration, key: &str, value: &str) -> Result<()> {
  match key {
    "excluded-tags" => config.excluded_tags = ExcludedTags::parse(value),
    "cursor-placement" => {
      config.cursor_placement = match value.trim().to_ascii_lowercase().as_str() {
        "between" => CursorPlacement::Between,
        "after" => CursorPlacement::After,
        other => bail!("cursor-placement must be `between` or `after`, got `{other}`"),
      }
    },
    "skip-fenced-code-blocks" => config.skip_fenced_code_blocks = parse_bool(key, value)?,
    "skip-inline-code-spans" => config.skip_inline_code_spans = parse_bool(key, value)?,
    _ => bail!("unknown option `{key}` (expected one of: {})", KEYS.join(", ")),
  }
  Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
  match value.trim() {
    "true" | "on" | "yes" => Ok(true),
    "false" | "off" | "no" => Ok(false),
    other => bail!("{key} expects a boolean, got `{other}`"),
  }
}
