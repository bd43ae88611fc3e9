//! Command-line interface for bundlecheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::bundle::GeneratedFile;
use crate::languages::Language;
use crate::policy::Policy;
use crate::report;
use crate::validate::Validator;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default policy file names to search for.
const DEFAULT_POLICY_NAMES: &[&str] = &["bundlecheck.yaml", ".bundlecheck.yaml"];

/// Directories never included in a bundle.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "vendor", "__pycache__", ".git"];

/// Static validation gate for AI-generated source bundles.
///
/// Bundlecheck runs a generated bundle through syntax, dependency, structure
/// and pattern checks and reports every finding with a confidence score.
#[derive(Parser)]
#[command(name = "bundlecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a directory as one generated bundle
    Check(CheckArgs),
    /// Write the default policy as YAML
    Policy(PolicyArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Bundle directory
    pub dir: PathBuf,

    /// Bundle language: javascript, typescript, python, go, rust (or js, ts, py, golang, rs)
    #[arg(short, long)]
    pub language: String,

    /// Path to policy YAML file (default: auto-discover)
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the policy command.
#[derive(Parser)]
pub struct PolicyArgs {
    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

/// Discover a policy file in the current directory.
fn discover_policy() -> Option<PathBuf> {
    DEFAULT_POLICY_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

/// Read every file under `root` into a bundle with paths relative to it.
///
/// Files that cannot be read as UTF-8 are skipped.
pub fn collect_bundle(root: &Path) -> anyhow::Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // The root itself may be "." or a hidden directory
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            !is_skipped_dir(&e.file_name().to_string_lossy())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let content = match std::fs::read(path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(_) => {
                    warn!(file = %relative, "skipping non-UTF-8 file");
                    continue;
                }
            },
            Err(e) => {
                warn!(file = %relative, error = %e, "skipping unreadable file");
                continue;
            }
        };

        files.push(GeneratedFile::new(relative, content));
    }

    Ok(files)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let language: Language = match args.language.parse() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Load policy
    let policy = match args.policy.clone().or_else(discover_policy) {
        Some(path) => match Policy::parse_file(&path) {
            Ok(p) => {
                debug!(policy = %path.display(), "policy loaded");
                p
            }
            Err(e) => {
                eprintln!("Error parsing policy: {:#}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => Policy::default(),
    };

    let validator = match Validator::new(policy) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: invalid policy: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Check the bundle directory
    match std::fs::metadata(&args.dir) {
        Ok(m) if m.is_dir() => {}
        Ok(_) => {
            eprintln!("Error: {} is not a directory", args.dir.display());
            return Ok(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: cannot access {}: {}", args.dir.display(), e);
            return Ok(EXIT_ERROR);
        }
    }

    let files = collect_bundle(&args.dir)?;
    if files.is_empty() {
        eprintln!("Warning: no files in {}", args.dir.display());
    }

    let result = validator.validate(&files, language);

    let path_str = args.dir.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, language, &result)?,
        _ => report::write_pretty(&path_str, language, &result),
    }

    if result.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the policy command.
pub fn run_policy(args: &PolicyArgs) -> anyhow::Result<i32> {
    let yaml = Policy::default().to_yaml()?;

    let Some(output) = &args.output else {
        print!("{}", yaml);
        return Ok(EXIT_SUCCESS);
    };

    if output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(output, yaml) {
        eprintln!("Error: failed to write policy: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to tune thresholds and patterns", output.display());
    println!(
        "  2. Run: bundlecheck check <DIR> --language <LANG> --policy {}",
        output.display()
    );

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_dirs() {
        assert!(is_skipped_dir("node_modules"));
        assert!(is_skipped_dir(".venv"));
        assert!(is_skipped_dir("__pycache__"));
        assert!(!is_skipped_dir("src"));
    }

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "bundlecheck",
            "check",
            "out",
            "--language",
            "ts",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.dir, PathBuf::from("out"));
                assert_eq!(args.language, "ts");
                assert_eq!(args.format, "json");
                assert!(args.verbose);
                assert!(args.policy.is_none());
            }
            Commands::Policy(_) => panic!("expected check"),
        }
    }

    #[test]
    fn test_check_requires_language() {
        assert!(Cli::try_parse_from(["bundlecheck", "check", "out"]).is_err());
    }
}
