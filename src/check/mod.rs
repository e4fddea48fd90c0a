pub mod codebase;
pub mod deployment;
pub mod documentation;
pub mod infrastructure;
pub mod monitoring;
pub mod output;
pub mod performance;
pub mod registry;
pub mod report;
pub mod score;
pub mod security;
pub mod workspace;

use crate::config::Config;
use crate::utils::Result;
use report::ReadinessReport;
use std::path::{Path, PathBuf};
use std::time::Instant;
use workspace::Workspace;

pub struct CheckOptions {
    pub workspace: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub format: String,
    pub verbose: bool,
}

/// Runs the full checklist. Returns whether the workspace is ready.
pub fn run_check(opts: &CheckOptions) -> Result<bool> {
    output::validate_format(&opts.format)?;

    let root = workspace_root(opts.workspace.as_deref())?;
    let checks = registry::checklist();
    let config = load_config(opts.config.as_deref(), &root, &checks)?;

    tracing::info!("workspace root: {}", root.display());
    let ws = Workspace::new(root, config);

    let started = Instant::now();
    let results = registry::run_all(&checks, &ws);
    let elapsed = started.elapsed();

    let report = ReadinessReport::build(chrono::Local::now().to_rfc3339(), results, ws.config());

    let report_path = opts
        .report
        .clone()
        .unwrap_or_else(|| ws.root().join(report::REPORT_FILE));
    report.save(&report_path)?;
    tracing::info!("report saved to {}", report_path.display());

    let summary = output::RunSummary {
        elapsed,
        report_path: &report_path,
        threshold: ws.config().pass_threshold,
    };
    output::display(&report, &summary, &opts.format, opts.verbose)?;

    Ok(report.overall_passed())
}

/// Prints the registered checks with their category and critical flag.
pub fn list_checks(config_path: Option<&Path>, workspace: Option<&Path>) -> Result<()> {
    let root = workspace_root(workspace)?;
    let checks = registry::checklist();
    let config = load_config(config_path, &root, &checks)?;
    for check in &checks {
        let flags = if config.is_critical(check.name()) {
            "  [critical]"
        } else if config.is_skipped(check.name()) {
            "  [skipped]"
        } else {
            ""
        };
        println!("{:<16} {}{}", check.category(), check.name(), flags);
    }
    Ok(())
}

fn workspace_root(explicit: Option<&Path>) -> Result<PathBuf> {
    Ok(match explicit {
        Some(p) => p.to_path_buf(),
        None => resolve_root(&std::env::current_dir()?, &Config::default().repos.devtools),
    })
}

fn load_config(explicit: Option<&Path>, root: &Path, checks: &[Box<dyn registry::Check>]) -> Result<Config> {
    let config = Config::load(explicit, root)?;
    config.validate(&registry::names(checks))?;
    Ok(config)
}

/// When launched from inside the devtools repo (or its `scripts/` or
/// `scripts/testing/` folder), the workspace is the directory above it.
pub fn resolve_root(cwd: &Path, devtools: &str) -> PathBuf {
    let name = |p: &Path| p.file_name().and_then(|n| n.to_str()).map(str::to_string);
    let up = |p: &Path, n: usize| {
        let mut p = p.to_path_buf();
        for _ in 0..n {
            if !p.pop() {
                break;
            }
        }
        p
    };

    match name(cwd).as_deref() {
        Some("testing") => up(cwd, 3),
        Some("scripts") => up(cwd, 2),
        Some(n) if n == devtools => up(cwd, 1),
        _ => cwd.to_path_buf(),
    }
}
