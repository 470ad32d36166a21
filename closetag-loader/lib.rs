//! Where closetag keeps its files, and how configuration is persisted.

pub mod config;

use std::{
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

pub use crate::config::{
  ConfigError,
  ConfigStore,
  load_config,
  save_config,
};

const APP_DIR: &str = "closetag";

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  ensure_parent_dir(&config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

/// `$CLOSETAG_CONFIG_DIR`, else the platform config directory.
pub fn config_dir() -> PathBuf {
  if let Some(dir) = std::env::var_os("CLOSETAG_CONFIG_DIR") {
    return PathBuf::from(dir);
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.config_dir().join(APP_DIR),
    Err(err) => {
      log::warn!("no home directory ({err}), using the working directory");
      PathBuf::from(".").join(APP_DIR)
    },
  }
}

fn cache_dir() -> PathBuf {
  match choose_base_strategy() {
    Ok(strategy) => strategy.cache_dir().join(APP_DIR),
    Err(_) => PathBuf::from(".").join(APP_DIR),
  }
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE.get().cloned().unwrap_or_else(default_config_file)
}

pub fn log_file() -> PathBuf {
  LOG_FILE.get().cloned().unwrap_or_else(default_log_file)
}

pub fn default_config_file() -> PathBuf {
  config_dir().join("config.toml")
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("closetag.log")
}

fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent() {
    if !parent.exists() {
      if let Err(err) = std::fs::create_dir_all(parent) {
        log::warn!("could not create {}: {err}", parent.display());
      }
    }
  }
}
