//! tm-merge - merges extracted mod strings into the translation memory

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use mod_translation_core::{pipeline, resolve_root, MergeConfig, MergePipeline, MergeReport};
use tracing_subscriber::filter::LevelFilter;

/// Exit status when diagnostics were recorded
const EXIT_DIAGNOSTICS: u8 = 1;
/// Exit status when the pass could not complete
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "tm-merge")]
#[command(about = "Merge extracted mod strings into the translation memory", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Repository root (default: search upward for the marker directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep a timestamped copy of the previous memory file
    #[arg(long)]
    pub backup: bool,

    /// Print the merged memory to stdout instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// A pass that finished but recorded diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFailure {
    pub errors: usize,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::error::{} error(s) found", self.errors)
    }
}

impl RunFailure {
    pub fn from_report(report: &MergeReport) -> Option<Self> {
        if report.is_clean() {
            None
        } else {
            Some(Self {
                errors: report.error_count(),
            })
        }
    }
}

/// Run the tm-merge CLI
pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(report) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            match emit(&cli, &report, &mut out) {
                Ok(None) => ExitCode::SUCCESS,
                Ok(Some(_)) => ExitCode::from(EXIT_DIAGNOSTICS),
                Err(err) => {
                    log::error!("{:#}", err);
                    ExitCode::from(EXIT_FATAL)
                }
            }
        }
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    // fails only if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

/// Command-line flags layered over the YAML config.
pub fn load_config(cli: &Cli) -> anyhow::Result<MergeConfig> {
    let mut config = pipeline::load_config(cli.config.as_deref())?;
    if cli.backup {
        config.memory.backup = true;
    }
    Ok(config)
}

/// Locate the repository and run the pass.
pub fn execute(cli: &Cli) -> anyhow::Result<MergeReport> {
    let config = load_config(cli)?;
    let root = resolve_root(&config, cli.root.as_deref())?;
    log::info!("repository root: {}", root.display());

    let pipeline = MergePipeline::new(root, config);
    let report = if cli.dry_run {
        pipeline.dry_run()?
    } else {
        pipeline.run()?
    };
    Ok(report)
}

/// Print the outputs of a finished pass and decide whether it failed.
pub fn emit(
    cli: &Cli,
    report: &MergeReport,
    out: &mut impl Write,
) -> anyhow::Result<Option<RunFailure>> {
    if cli.dry_run {
        out.write_all(report.output.as_bytes())?;
    }

    if let Some(path) = &cli.report {
        write_report(report, path)?;
    }

    for diagnostic in &report.diagnostics {
        writeln!(out, "{}", diagnostic.to_annotation())?;
    }

    let failure = RunFailure::from_report(report);
    if let Some(failure) = failure {
        writeln!(out, "{}", failure)?;
    }
    out.flush()?;
    Ok(failure)
}

fn write_report(report: &MergeReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
    log::info!("report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["tm-merge"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn repo(en: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let module = dir.path().join("data/output_files/Mod_7");
        fs::create_dir_all(&module).unwrap();
        fs::create_dir_all(dir.path().join("data/completed_files/7")).unwrap();
        fs::write(module.join("EN_output.txt"), en).unwrap();
        fs::write(module.join("CN_output.txt"), "").unwrap();
        fs::write(dir.path().join("data/completed_files/7/en_completed.txt"), "").unwrap();
        dir
    }

    #[test]
    fn parses_all_flags() {
        let parsed = cli(&[
            "--root", "/tmp/repo", "--config", "merge.yaml", "--backup", "--dry-run",
            "--report", "report.json", "-v",
        ]);
        assert_eq!(parsed.root, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(parsed.config, Some(PathBuf::from("merge.yaml")));
        assert!(parsed.backup && parsed.dry_run && parsed.verbose);
        assert_eq!(parsed.report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn defaults_are_off() {
        let parsed = cli(&[]);
        assert_eq!(parsed.root, None);
        assert!(!parsed.backup && !parsed.dry_run && !parsed.verbose);
    }

    #[test]
    fn backup_flag_overrides_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("merge.yaml");
        fs::write(&path, "memory:\n  backup: false\n  tags:\n    target: KO\n").unwrap();

        let config = load_config(&cli(&["--config", path.to_str().unwrap(), "--backup"])).unwrap();

        assert!(config.memory.backup);
        assert_eq!(config.memory.tags.target, "KO");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(&cli(&["--config", "/nonexistent/merge.yaml"])).is_err());
    }

    #[test]
    fn clean_run_prints_nothing() {
        let dir = repo("a = \"A\",\n");
        let cli = cli(&["--root", dir.path().to_str().unwrap()]);

        let report = execute(&cli).unwrap();
        let mut out = Vec::new();
        let failure = emit(&cli, &report, &mut out).unwrap();

        assert_eq!(failure, None);
        assert!(out.is_empty());
        assert!(dir.path().join("data/translations_CN.txt").exists());
    }

    #[test]
    fn diagnostics_become_annotations_and_summary() {
        let dir = repo("a = \"A\",\nnot a record\n");
        let report_path = dir.path().join("report.json");
        let cli = cli(&[
            "--root",
            dir.path().to_str().unwrap(),
            "--dry-run",
            "--report",
            report_path.to_str().unwrap(),
        ]);

        let report = execute(&cli).unwrap();
        let mut out = Vec::new();
        let failure = emit(&cli, &report, &mut out).unwrap();

        assert_eq!(failure, Some(RunFailure { errors: 1 }));
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("\n------ 7 :: Mod ------\n"));
        assert!(printed.contains(",line=2::Format Error: not a record\n"));
        assert!(printed.ends_with("::error::1 error(s) found\n"));
        assert!(!dir.path().join("data/translations_CN.txt").exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
        assert_eq!(json["diagnostics"][0]["kind"], "format");
        assert_eq!(json["diagnostics"][0]["line"], 2);
    }

    #[test]
    fn missing_output_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cli = cli(&["--root", dir.path().to_str().unwrap()]);
        assert!(execute(&cli).is_err());
    }
}
