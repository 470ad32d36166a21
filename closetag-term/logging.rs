use std::path::Path;

use anyhow::Result;

/// Routes `log` records (and `tracing` events through its `log` feature) to
/// `log_file`. With any verbosity, records are mirrored to stderr.
pub fn setup_logging(verbosity: u8, log_file: &Path) -> Result<()> {
  let level = match verbosity {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };

  let mut base = fern::Dispatch::new().level(level);
  if verbosity > 0 {
    base = base.chain(
      fern::Dispatch::new()
        .format(|out, message, record| {
          out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .chain(std::io::stderr()),
    );
  }

  let file = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .chain(fern::log_file(log_file)?);

  base.chain(file).apply()?;
  Ok(())
}
