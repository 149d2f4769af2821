//! `validate` command
//!
//! Loads each configuration file through the full pipeline and reports
//! errors and warnings per file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::error::{ConfigError, RouletteError, Severity, ValidationIssue};

/// Validate configuration files without spinning.
///
/// Every file is checked before returning; the first failure decides the
/// error.
///
/// # Errors
///
/// Returns the first file's config error, or a validation error for
/// warnings under `--strict`.
pub fn run(args: &ValidateArgs) -> Result<(), RouletteError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error = None;

    for path in &args.files {
        info!(file = %path.display(), "validating configuration");
        let outcome = check(&loader, path, args.strict);
        let report = FileReport::new(path, &outcome);
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        } else {
            info!(file = %path.display(), "configuration valid");
        }
        reports.push(report);
    }

    let summary = Summary {
        total: reports.len(),
        valid: reports.iter().filter(|r| r.valid).count(),
        invalid: reports.iter().filter(|r| !r.valid).count(),
    };

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                report.print_human();
            }
            println!(
                "\n{} file(s): {} valid, {} invalid",
                summary.total, summary.valid, summary.invalid
            );
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "files": reports, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

/// Loads one file; under `strict`, warnings fail it.
fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> Result<LoadResult, ConfigError> {
    let loaded = loader.load(path)?;
    if strict && !loaded.warnings.is_empty() {
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors: loaded
                .warnings
                .iter()
                .map(|w| ValidationIssue {
                    path: w.location.clone().unwrap_or_default(),
                    message: w.message.clone(),
                    severity: Severity::Error,
                })
                .collect(),
        });
    }
    Ok(loaded)
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl FileReport {
    fn new(path: &Path, outcome: &Result<LoadResult, ConfigError>) -> Self {
        let (errors, warnings) = match outcome {
            Ok(loaded) => (
                Vec::new(),
                loaded
                    .warnings
                    .iter()
                    .map(|w| match &w.location {
                        Some(at) => format!("{} at {at}", w.message),
                        None => w.message.clone(),
                    })
                    .collect(),
            ),
            Err(ConfigError::ValidationError { errors, .. }) => {
                (errors.iter().map(ToString::to_string).collect(), Vec::new())
            }
            Err(e) => (vec![e.to_string()], Vec::new()),
        };
        Self {
            path: path.to_path_buf(),
            valid: outcome.is_ok(),
            errors,
            warnings,
        }
    }

    fn print_human(&self) {
        let mark = if self.valid { "✓" } else { "✗" };
        println!("{mark} {}", self.path.display());
        for error in &self.errors {
            println!("    {error}");
        }
        for warning in &self.warnings {
            println!("    warning: {warning}");
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn test_valid_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "ok.yaml", "spin:\n  min_rotations: 3\n");
        let outcome = check(&ConfigLoader::with_defaults(), &path, false);
        let report = FileReport::new(&path, &outcome);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_invalid_file_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "bad.yaml",
            "spin:\n  min_rotations: 9\n  max_rotations: 2\n",
        );
        let outcome = check(&ConfigLoader::with_defaults(), &path, false);
        let report = FileReport::new(&path, &outcome);
        assert!(!report.valid);
        assert!(!report.errors.is_empty());
        assert!(matches!(outcome, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_missing_file_reported() {
        let path = PathBuf::from("/nonexistent/roulette.yaml");
        let outcome = check(&ConfigLoader::with_defaults(), &path, false);
        let report = FileReport::new(&path, &outcome);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_run_returns_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_config(&dir, "ok.yaml", "");
        let bad = write_config(&dir, "bad.yaml", "spin: [");
        let args = ValidateArgs {
            files: vec![good, bad],
            format: OutputFormat::Json,
            strict: false,
        };
        let err = run(&args).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::ExitCode::CONFIG_ERROR);
    }
}
