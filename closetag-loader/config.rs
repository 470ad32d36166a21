use std::{
  fs,
  io,
  path::{
    Path,
    PathBuf,
  },
};

use closetag_lib::Configuration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to access {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("invalid config {path}: {source}")]
  Parse {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
  #[error(transparent)]
  Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Reads the configuration at `path`. Keys missing from the file, or a
/// missing file, fall back to defaults.
pub fn load_config(path: &Path) -> Result<Configuration> {
  let text = match fs::read_to_string(path) {
    Ok(text) => text,
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      log::debug!("no config at {}, using defaults", path.display());
      return Ok(Configuration::default());
    },
    Err(source) => {
      return Err(ConfigError::Io {
        path: path.to_path_buf(),
        source,
      });
    },
  };

  toml::from_str(&text).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

pub fn save_config(path: &Path, config: &Configuration) -> Result<()> {
  let text = toml::to_string_pretty(config)?;
  let io_err = |source| ConfigError::Io {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  fs::write(path, text).map_err(io_err)
}

/// A configuration bound to its file. Every update is written back.
#[derive(Debug)]
pub struct ConfigStore {
  path:   PathBuf,
  config: Configuration,
}

impl ConfigStore {
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let config = load_config(&path)?;
    Ok(Self { path, config })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn config(&self) -> &Configuration {
    &self.config
  }

  /// Applies `change` and persists the result. On a write failure the
  /// in-memory value keeps the change.
  pub fn update(&mut self, change: impl FnOnce(&mut Configuration)) -> Result<&Configuration> {
    change(&mut self.config);
    save_config(&self.path, &self.config)?;
    log::info!("saved config to {}", self.path.display());
    Ok(&self.config)
  }
}

#[cfg(test)]
mod test {
  use closetag_lib::{
    CursorPlacement,
    ExcludedTags,
  };

  use super::*;

  #[test]
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join("none.toml")).unwrap();
    assert_eq!(config, Configuration::default());
  }

  #[test]
  fn persisted_values_overlay_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "excluded-tags = \"i, b\"\nskip-fenced-code-blocks = true\n").unwrap();

    let config = load_config(&path).unwrap();
    assert!(config.excluded_tags.contains("B"));
    assert!(config.skip_fenced_code_blocks);
    assert!(config.skip_inline_code_spans);
    assert_eq!(config.cursor_placement, CursorPlacement::Between);
  }

  #[test]
  fn bad_config_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "cursor-placement = 3").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
  }

  #[test]
  fn store_persists_every_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/config.toml");

    let mut store = ConfigStore::open(&path).unwrap();
    store
      .update(|config| config.cursor_placement = CursorPlacement::After)
      .unwrap();
    store
      .update(|config| config.excluded_tags = ExcludedTags::parse("span"))
      .unwrap();

    let reopened = ConfigStore::open(&path).unwrap();
    assert_eq!(reopened.config(), store.config());
    assert_eq!(reopened.config().cursor_placement, CursorPlacement::After);
    assert!(reopened.config().excluded_tags.contains("span"));
  }
}
