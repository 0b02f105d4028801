use anyhow::Context;
use clap::Args;
use sdd_core::config::{Config, WarnLevel};
use sdd_core::sync::{execute_sync, SyncOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Exit code when `--ci` is set and the sync rate is below the threshold.
pub const EXIT_THRESHOLD_FAILED: i32 = 2;
/// Exit code when requirements are missing (non-JSON mode).
pub const EXIT_MISSING: i32 = 1;

#[derive(Args)]
pub struct SyncArgs {
    /// Only check this spec (directory name under .sdd/specs)
    spec_id: Option<String>,

    /// Source directory, relative to the project root
    #[arg(long = "src", value_name = "DIR")]
    src_dir: Option<String>,

    /// Glob of source files to scan (repeatable, relative to --src)
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Glob of source files to skip (repeatable, relative to --src)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Test directory, relative to the project root (repeatable)
    #[arg(long = "tests", value_name = "DIR")]
    test_dirs: Vec<String>,

    /// Minimum sync rate required with --ci (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    threshold: Option<u32>,

    /// Fail with a distinct exit code when the sync rate is below the threshold
    #[arg(long)]
    ci: bool,

    /// Render the report as markdown (ignored with --json)
    #[arg(long)]
    markdown: bool,

    /// Disable ANSI colors in terminal output
    #[arg(long)]
    no_color: bool,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Returns the process exit code.
pub fn run(root: &Path, args: SyncArgs, json: bool) -> anyhow::Result<i32> {
    warn_on_config(root)?;

    let colors = !args.no_color
        && args.output.is_none()
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();

    let options = SyncOptions {
        spec_id: args.spec_id,
        src_dir: args.src_dir,
        include: args.include,
        exclude: args.exclude,
        test_dirs: args.test_dirs,
        threshold: args.threshold,
        ci: args.ci,
        json,
        markdown: args.markdown,
        colors,
    };

    let outcome = execute_sync(root, &options);

    let Some(data) = outcome.data else {
        let message = outcome.error.unwrap_or_else(|| "unknown error".to_string());
        anyhow::bail!(message);
    };

    match &args.output {
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir()?.join(path)
            };
            sdd_core::io::atomic_write(&path, data.output.as_bytes())
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            if !json {
                println!("Report written to {}", path.display());
            }
        }
        None => println!("{}", data.output.trim_end()),
    }

    if outcome.threshold_failed {
        eprintln!(
            "error: {}",
            outcome.error.as_deref().unwrap_or("sync threshold not met")
        );
        return Ok(EXIT_THRESHOLD_FAILED);
    }

    if !json && !data.result.missing.is_empty() {
        return Ok(EXIT_MISSING);
    }

    Ok(0)
}

/// Surface config problems before scanning. Errors abort; warnings go to stderr.
fn warn_on_config(root: &Path) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load .sdd/config.yaml")?;
    let warnings = config.validate();
    for w in &warnings {
        let prefix = match w.level {
            WarnLevel::Warning => "warning",
            WarnLevel::Error => "error",
        };
        eprintln!("[{prefix}] {}", w.message);
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
