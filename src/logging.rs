use std::path::Path;

use anyhow::{Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// File level for a configured `level` raised by `verbose` `-v` flags.
pub fn level_filter(level: &str, verbose: u8) -> Result<LevelFilter> {
    let base: LevelFilter = level
        .parse()
        .with_context(|| format!("unknown log level {:?}", level))?;
    let raised = match verbose {
        0 => base,
        1 => base.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    };
    Ok(raised)
}

/// Logs to `path`. With `echo` set, records are also written to stderr in
/// color, since stdout belongs to the menus.
pub fn setup_logger(path: &Path, level: LevelFilter, echo: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create log directory: {}", parent.display()))?;
    }

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(
            fern::log_file(path)
                .with_context(|| format!("could not open log file: {}", path.display()))?,
        );

    let mut dispatch = fern::Dispatch::new().level(level).chain(file);

    if echo {
        let colors = ColoredLevelConfig::new()
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red)
            .debug(Color::Cyan);
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!("[{}] {}", colors.color(record.level()), message))
                })
                .chain(std::io::stderr()),
        );
    }

    dispatch.apply().context("logger already installed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("info", 0, LevelFilter::Info)]
    #[case("warn", 1, LevelFilter::Debug)]
    #[case("trace", 1, LevelFilter::Trace)]
    #[case("off", 2, LevelFilter::Trace)]
    fn verbosity_raises_level(
        #[case] level: &str,
        #[case] verbose: u8,
        #[case] expected: LevelFilter,
    ) {
        assert_eq!(level_filter(level, verbose).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(level_filter("loud", 0).is_err());
    }
}
