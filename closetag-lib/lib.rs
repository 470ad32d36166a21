//! Tag matching and auto-closing for markup typed into a text editor.
//!
//! The crate is split the same way the work is split:
//!
//! - [`detector`] classifies a single tag (self-closing, excluded, inside code).
//! - [`balancer`] scans whole documents for unclosed tags.
//! - [`engine`] drives both against an [`host::EditorHost`].

pub mod balancer;
pub mod config;
pub mod debounce;
pub mod detector;
pub mod engine;
pub mod host;
pub mod position;
pub mod tag;

pub use config::{
  Configuration,
  CursorPlacement,
  ExcludedTags,
};
pub use engine::{
  Outcome,
  SkipReason,
  TagEngine,
};
pub use position::Position;
