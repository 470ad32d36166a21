use std::collections::BTreeSet;

use serde::{
  Deserialize,
  Serialize,
};

/// Where the cursor lands after a closing tag is inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPlacement {
  /// `<div>|</div>`
  #[default]
  Between,
  /// `<div></div>|`
  After,
}

/// Tag names that are never auto-closed, stored lowercased.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExcludedTagsRepr", into = "Vec<String>")]
pub struct ExcludedTags(BTreeSet<String>);

/// Persisted form: a list, or a single comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ExcludedTagsRepr {
  List(Vec<String>),
  Csv(String),
}

impl ExcludedTags {
  pub fn new<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self(
      names
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect(),
    )
  }

  /// Parses `"div, span,  i"` style input.
  pub fn parse(csv: &str) -> Self {
    Self::new(csv.split(','))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains(&name.to_lowercase())
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }
}

impl From<ExcludedTagsRepr> for ExcludedTags {
  fn from(repr: ExcludedTagsRepr) -> Self {
    match repr {
      ExcludedTagsRepr::List(names) => Self::new(names),
      ExcludedTagsRepr::Csv(csv) => Self::parse(&csv),
    }
  }
}

impl From<ExcludedTags> for Vec<String> {
  fn from(tags: ExcludedTags) -> Self {
    tags.0.into_iter().collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
  pub excluded_tags:           ExcludedTags,
  pub cursor_placement:        CursorPlacement,
  /// Ignore tags inside ```` ``` ```` fenced blocks.
  pub skip_fenced_code_blocks: bool,
  /// Ignore tags inside `inline code`.
  pub skip_inline_code_spans:  bool,
}

impl Default for Configuration {
  fn default() -> Self {
    Self {
      excluded_tags:           ExcludedTags::default(),
      cursor_placement:        CursorPlacement::Between,
      skip_fenced_code_blocks: false,
      skip_inline_code_spans:  true,
    }
  }
}
