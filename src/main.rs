//! voxedit - headless runner for area edit commands
//!
//! Builds a flat world from `config/voxedit.toml`, then runs commands from a
//! JSON command script or from stdin, one line per command.

mod command_script;
mod commands;
mod config;
mod headless;

use anyhow::{Context, Result};
use command_script::CommandScript;
use config::AppConfig;
use headless::HeadlessRunner;
use std::io::Write;
use std::{env, path::PathBuf};
use tracing::info;

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    command_script: Option<PathBuf>,
    transcript: Option<PathBuf>,
    max_ticks: Option<u64>,
    quiet: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut opts = CliOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => opts.config = Some(next_path(&mut args, "--config")?),
                "--command-script" => {
                    opts.command_script = Some(next_path(&mut args, "--command-script")?)
                }
                "--transcript" => opts.transcript = Some(next_path(&mut args, "--transcript")?),
                "--max-ticks" => {
                    let value = args.next().context("--max-ticks requires a value")?;
                    opts.max_ticks = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid --max-ticks value '{value}'"))?,
                    );
                }
                "--quiet" => opts.quiet = true,
                other => tracing::warn!("ignoring unknown argument {other}"),
            }
        }
        Ok(opts)
    }
}

fn next_path<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .with_context(|| format!("{flag} requires a path"))
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting voxedit v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1))?;
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    };
    let mut runner = HeadlessRunner::new(&config)?;

    match &cli.command_script {
        Some(path) => {
            let mut script = CommandScript::from_path(path)?;
            runner.run_script(&mut script, cli.max_ticks)?;
        }
        None => runner.run_lines(std::io::stdin().lock())?,
    }

    if !cli.quiet {
        let mut stdout = std::io::stdout().lock();
        for entry in runner.transcript() {
            for line in &entry.output.lines {
                writeln!(stdout, "[{}] {}", entry.tick, line.text)?;
            }
        }
    }
    if let Some(path) = &cli.transcript {
        runner.write_transcript(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_paths_and_limits() {
        let opts = parse(&[
            "--config",
            "a.toml",
            "--command-script",
            "b.json",
            "--max-ticks",
            "40",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(opts.config, Some(PathBuf::from("a.toml")));
        assert_eq!(opts.command_script, Some(PathBuf::from("b.json")));
        assert_eq!(opts.max_ticks, Some(40));
        assert!(opts.quiet);
        assert!(opts.transcript.is_none());
    }

    #[test]
    fn missing_values_are_errors() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--max-ticks", "soon"]).is_err());
    }
}
