//! 代码库类检查：质量分析、测试、构建、lint 配置

use crate::check::registry::{ratio, tally, FnCheck, Outcome};
use crate::check::workspace::Workspace;
use crate::utils::command;
use crate::utils::{Category, ReadyError, Result};
use regex::Regex;
use std::collections::BTreeMap;

pub const CHECKS: [FnCheck; 4] = [
    FnCheck::new("Code Quality", Category::Codebase, code_quality),
    FnCheck::new("Test Coverage", Category::Codebase, test_coverage),
    FnCheck::new("Build Success", Category::Codebase, build_success),
    FnCheck::new("Linting", Category::Codebase, linting),
];

const QUALITY_REPORT: &str = "QUALITY_ANALYSIS.json";
const QUALITY_PASS: f64 = 60.0;

// ── 质量分析 ────────────────────────────────────────────────────────────────

pub fn code_quality(ws: &Workspace) -> Result<Outcome> {
    let analyzer = ws
        .repo(&ws.repos().devtools)
        .join("scripts")
        .join("analysis")
        .join("repo_quality_analyzer.py");
    if !analyzer.exists() {
        return Ok(Outcome::fail(0.0, "Quality analyzer not found"));
    }

    let script = analyzer.to_string_lossy();
    let out = command::run(&ws.config().python, &[script.as_ref()], ws.root(), ws.timeouts().analyzer())?;
    if !out.success() {
        tracing::debug!("quality analyzer exited with {}: {}", out.status, out.stderr.trim());
    }

    let report = ws.root().join(QUALITY_REPORT);
    if !report.exists() {
        return Ok(Outcome::fail(0.0, "Quality report not generated"));
    }
    let content = std::fs::read_to_string(&report)?;
    let data: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| ReadyError::Parse(format!("{}: {}", QUALITY_REPORT, e)))?;
    let avg = data
        .pointer("/average/total")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0);

    let outcome = if avg >= QUALITY_PASS {
        Outcome::pass(avg, format!("Quality score: {:.1}/100", avg))
    } else {
        Outcome::fail(avg, format!("Quality score: {:.1}/100 (below {})", avg, QUALITY_PASS))
    };
    Ok(outcome.with("average", &data["average"]))
}

// ── 测试 ────────────────────────────────────────────────────────────────────

pub fn test_coverage(ws: &Workspace) -> Result<Outcome> {
    let runner = ws.repo(&ws.repos().devtools).join("run_all_tests.py");
    if !runner.exists() {
        return Ok(Outcome::fail(0.0, "Test runner not found"));
    }

    let script = runner.to_string_lossy();
    let out = command::run(&ws.config().python, &[script.as_ref()], ws.root(), ws.timeouts().tests())?;
    Ok(score_test_output(&out.stdout))
}

/// Reads an `N/M passed` summary out of test runner output.
pub fn score_test_output(output: &str) -> Outcome {
    let re = Regex::new(r"(?i)(\d+)/(\d+)\s+passed").ok();
    let counts = re
        .as_ref()
        .and_then(|re| re.captures(output))
        .and_then(|c| Some((c[1].parse::<usize>().ok()?, c[2].parse::<usize>().ok()?)))
        .filter(|(_, total)| *total > 0);

    match counts {
        Some((passed, total)) if passed >= total => {
            Outcome::pass(100.0, format!("All {} tests passed", total))
                .with("passed", passed)
                .with("total", total)
        }
        Some((passed, total)) => Outcome::fail(ratio(passed, total), format!("{}/{} tests passed", passed, total))
            .with("passed", passed)
            .with("total", total),
        None => Outcome::pass(80.0, "Tests executed"),
    }
}

// ── 构建 ────────────────────────────────────────────────────────────────────

pub fn build_success(ws: &Workspace) -> Result<Outcome> {
    let repos = ws.repos();
    let timeout = ws.timeouts().build();
    let mut builds: BTreeMap<String, bool> = BTreeMap::new();

    let core = ws.repo(&repos.core);
    if core.exists() {
        builds.insert("rust".to_string(), command::succeeds("cargo", &["build", "--release"], &core, timeout));
    }

    for project in [&repos.sdk, &repos.web] {
        let path = ws.repo(project);
        if path.join("package.json").exists() {
            builds.insert(project.clone(), command::succeeds("npm", &["run", "build"], &path, timeout));
        }
    }

    if builds.is_empty() {
        return Ok(Outcome::fail(0.0, "No buildable projects found"));
    }

    let ok = builds.values().filter(|v| **v).count();
    let total = builds.len();
    let outcome = if ok == total {
        Outcome::pass(100.0, format!("All {} builds successful", total))
    } else {
        Outcome::fail(ratio(ok, total), format!("{}/{} builds successful", ok, total))
    };
    Ok(outcome.with("builds", builds))
}

// ── lint ────────────────────────────────────────────────────────────────────

pub fn linting(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let configs = ws.existing(
        &[&r.core, &r.sdk, &r.web],
        &["clippy.toml", ".eslintrc.json", ".prettierrc"],
    );
    Ok(tally(configs, 20.0, 5, "lint configs", "configs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    #[test]
    fn parses_partial_test_summary() {
        let o = score_test_output("running...\n7/10 PASSED\n");
        assert!(!o.passed);
        assert!((o.score - 70.0).abs() < 1e-9);
        assert_eq!(o.message, "7/10 tests passed");
    }

    #[test]
    fn all_passed_summary_scores_full() {
        let o = score_test_output("Summary: 12/12 passed");
        assert!(o.passed);
        assert_eq!(o.score, 100.0);
    }

    #[test]
    fn unparsable_output_counts_as_executed() {
        let o = score_test_output("done");
        assert!(o.passed);
        assert_eq!(o.score, 80.0);
        let o = score_test_output("0/0 passed");
        assert_eq!(o.message, "Tests executed");
    }

    #[test]
    fn missing_analyzer_and_runner_fail_with_zero() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path(), Config::default());
        let o = code_quality(&ws).unwrap();
        assert_eq!((o.passed, o.score), (false, 0.0));
        let o = test_coverage(&ws).unwrap();
        assert_eq!((o.passed, o.score), (false, 0.0));
    }

    #[test]
    fn no_buildable_projects_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path(), Config::default());
        let o = build_success(&ws).unwrap();
        assert!(!o.passed);
        assert_eq!(o.message, "No buildable projects found");
    }

    #[test]
    fn lint_configs_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let core = dir.path().join("axionax-core");
        let web = dir.path().join("axionax-web");
        fs::create_dir_all(&core).unwrap();
        fs::create_dir_all(&web).unwrap();
        fs::write(core.join("clippy.toml"), "").unwrap();
        fs::write(web.join(".eslintrc.json"), "{}").unwrap();
        fs::write(web.join(".prettierrc"), "{}").unwrap();

        let ws = Workspace::new(dir.path(), Config::default());
        let o = linting(&ws).unwrap();
        assert!(!o.passed);
        assert_eq!(o.score, 60.0);
        assert_eq!(
            o.details["configs"],
            serde_json::json!(["axionax-core/clippy.toml", "axionax-web/.eslintrc.json", "axionax-web/.prettierrc"])
        );
    }

    /// Workspace whose "python" is `sh`, running `body` as the quality analyzer.
    #[cfg(unix)]
    fn with_analyzer(body: &str) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("axionax-devtools/scripts/analysis");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("repo_quality_analyzer.py"), body).unwrap();
        let mut cfg = Config::default();
        cfg.python = "sh".to_string();
        let ws = Workspace::new(dir.path(), cfg);
        (dir, ws)
    }

    #[cfg(unix)]
    #[test]
    fn quality_at_or_above_60_passes_with_its_average() {
        let (_dir, ws) = with_analyzer(
            "echo '{\"average\": {\"total\": 72.5, \"docs\": 60}}' > QUALITY_ANALYSIS.json\n",
        );
        let o = code_quality(&ws).unwrap();
        assert!(o.passed);
        assert_eq!(o.score, 72.5);
        assert_eq!(o.message, "Quality score: 72.5/100");
        assert_eq!(o.details["average"]["docs"], 60);
    }

    #[cfg(unix)]
    #[test]
    fn quality_below_60_fails_with_that_score() {
        let (_dir, ws) = with_analyzer("echo '{\"average\": {\"total\": 41}}' > QUALITY_ANALYSIS.json\n");
        let o = code_quality(&ws).unwrap();
        assert!(!o.passed);
        assert_eq!(o.score, 41.0);
    }

    #[cfg(unix)]
    #[test]
    fn analyzer_that_writes_nothing_fails() {
        let (_dir, ws) = with_analyzer("exit 1\n");
        let o = code_quality(&ws).unwrap();
        assert_eq!((o.passed, o.score), (false, 0.0));
        assert_eq!(o.message, "Quality report not generated");
    }

    #[cfg(unix)]
    #[test]
    fn malformed_quality_report_is_a_parse_error() {
        let (_dir, ws) = with_analyzer("echo 'not json' > QUALITY_ANALYSIS.json\n");
        let err = code_quality(&ws).unwrap_err();
        assert!(matches!(err, ReadyError::Parse(ref m) if m.contains("QUALITY_ANALYSIS.json")), "{}", err);
    }
}
