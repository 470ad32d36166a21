//! `closetag`: a headless host for the tag engine that works on files.

mod cli;
mod config_cli;
mod logging;
mod replay;

use std::{
  fs,
  path::Path,
  time::Duration,
};

use anyhow::{
  Context,
  Result,
};
use clap::Parser;
use closetag_lib::{
  Configuration,
  Outcome,
  Position,
  TagEngine,
  balancer::find_unclosed_tags,
  host::{
    Document,
    EditorHost,
  },
  position::split_lines,
};
use closetag_loader::ConfigStore;

use crate::cli::{
  Cli,
  Command,
  ConfigAction,
};

fn main() -> Result<()> {
  let cli = Cli::parse();

  closetag_loader::initialize_config_file(cli.config_file.clone());
  closetag_loader::initialize_log_file(cli.log_file.clone());
  logging::setup_logging(cli.verbosity, &closetag_loader::log_file())?;

  let config_path = closetag_loader::config_file();
  match cli.command {
    Command::Config { action } => run_config(&config_path, action),
    Command::Scan { file } => scan(&file, &load(&config_path)?),
    Command::Close { file, at, write } => {
      let mut doc = open_at(&file, at)?;
      let mut engine = TagEngine::new(load(&config_path)?);
      match engine.close_nearest_unclosed_tag(&mut doc)? {
        Outcome::Inserted { closing, at, .. } => log::info!("inserted {closing} at {at}"),
        Outcome::Skipped(reason) => log::info!("nothing inserted: {reason:?}"),
      }
      finish(&file, &doc, write)
    },
    Command::Type {
      file,
      at,
      text,
      paste,
      interval_ms,
      write,
    } => {
      let mut doc = open_at(&file, at)?;
      let mut engine = TagEngine::new(load(&config_path)?);
      let input = replay::Input {
        text: &text,
        paste,
        interval: Duration::from_millis(interval_ms),
      };
      let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
      let inserted = runtime.block_on(replay::replay(&mut engine, &mut doc, input))?;
      log::info!("{} closing tag(s) inserted", inserted.len());
      finish(&file, &doc, write)
    },
  }
}

fn load(path: &Path) -> Result<Configuration> {
  let config = closetag_loader::load_config(path)?;
  log::debug!("loaded {config:?} from {}", path.display());
  Ok(config)
}

fn run_config(path: &Path, action: ConfigAction) -> Result<()> {
  match action {
    ConfigAction::Path => println!("{}", path.display()),
    ConfigAction::Show => {
      let config = closetag_loader::load_config(path)?;
      print!("{}", toml::to_string_pretty(&config)?);
    },
    ConfigAction::Set { key, value } => {
      let mut store = ConfigStore::open(path)?;
      let mut updated = store.config().clone();
      config_cli::set_option(&mut updated, &key, &value)?;
      store.update(|config| *config = updated)?;
    },
  }
  Ok(())
}

fn scan(file: &Path, config: &Configuration) -> Result<()> {
  let text = read(file)?;
  let lines: Vec<&str> = split_lines(&text).collect();
  for record in find_unclosed_tags(&lines, config) {
    println!("{}:{}", record.line, record.name);
  }
  Ok(())
}

fn read(file: &Path) -> Result<String> {
  fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

fn open_at(file: &Path, at: Position) -> Result<Document> {
  let mut doc = Document::new(&read(file)?);
  doc
    .set_cursor(at)
    .with_context(|| format!("{} has no position {at}", file.display()))?;
  Ok(doc)
}

fn finish(file: &Path, doc: &Document, write: bool) -> Result<()> {
  if write {
    fs::write(file, doc.text()).with_context(|| format!("failed to write {}", file.display()))?;
  } else {
    print!("{}", doc.text());
  }
  Ok(())
}
