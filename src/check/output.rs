//! 输出层：接收 ReadinessReport，渲染 text 或 json

use crate::check::report::ReadinessReport;
use crate::check::score;
use crate::utils::{Category, CheckResult, ReadyError, Result};
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

const HIGH_PRIORITY_LIMIT: usize = 5;
const HIGH_PRIORITY_BELOW: f64 = 50.0;

/// Console context that is not part of the persisted report.
pub struct RunSummary<'a> {
    pub elapsed: Duration,
    pub report_path: &'a Path,
    pub threshold: f64,
}

pub fn display(report: &ReadinessReport, run: &RunSummary<'_>, format: &str, verbose: bool) -> Result<()> {
    match format {
        "json" => {
            println!("{}", report.to_json()?);
            Ok(())
        }
        "text" => {
            print!("{}", render_text(report, run, verbose));
            Ok(())
        }
        other => Err(ReadyError::Config(format!("unknown format: {}", other))),
    }
}

pub fn validate_format(format: &str) -> Result<()> {
    match format {
        "json" | "text" => Ok(()),
        other => Err(ReadyError::Config(format!("unknown format: {}", other))),
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

pub fn render_text(report: &ReadinessReport, run: &RunSummary<'_>, verbose: bool) -> String {
    let mut out = String::new();
    let results = report.results();

    // ── 逐项结果 ──────────────────────────────────────────────────────────
    for cat in Category::ALL {
        let in_cat: Vec<&CheckResult> = results.iter().filter(|r| r.category() == cat).collect();
        if in_cat.is_empty() {
            continue;
        }
        section(&mut out, &format!("{} CHECKS", cat.as_str().to_uppercase()));
        for r in in_cat {
            let _ = writeln!(out, "  {} {:<28} {:>5.1}  {}", icon(r), r.name(), r.score(), r.message());
            if verbose && !r.details().is_empty() {
                for (k, v) in r.details() {
                    let _ = writeln!(out, "        {:<12} : {}", k, v);
                }
            }
        }
    }

    // ── 总结 ──────────────────────────────────────────────────────────────
    section(&mut out, "SUMMARY");
    let status = if report.overall_passed() { "✅ READY FOR TESTNET" } else { "❌ NOT READY" };
    let _ = writeln!(out, "  Status       : {}", status);
    let _ = writeln!(out, "  Score        : {:.1}/100  (pass at {:.0})", report.overall_score(), run.threshold);
    let _ = writeln!(out, "  Elapsed      : {:.2}s", run.elapsed.as_secs_f64());
    let _ = writeln!(out, "  Generated at : {}", report.timestamp());
    let _ = writeln!(out, "  Report       : {}", run.report_path.display());

    let _ = writeln!(out, "\n  Category scores:");
    for c in score::category_scores(results) {
        let flag = if c.score >= 70.0 { "" } else if c.score >= 50.0 { "  ⚠" } else { "  ✗" };
        let _ = writeln!(out, "    {:<16} {:>5.1}/100  ({}/{} passed){}",
            c.category.title(), c.score, c.passed, c.total, flag);
    }

    let critical = score::critical_failures(results);
    if !critical.is_empty() {
        let _ = writeln!(out, "\n  ❌ Critical issues (must fix):");
        for r in &critical {
            let _ = writeln!(out, "    • {}: {}", r.name(), r.message());
        }
    }

    let high: Vec<&CheckResult> = results
        .iter()
        .filter(|r| !r.passed() && !r.critical() && r.score() < HIGH_PRIORITY_BELOW)
        .take(HIGH_PRIORITY_LIMIT)
        .collect();
    if !high.is_empty() {
        let _ = writeln!(out, "\n  ⚠  High priority improvements:");
        for r in high {
            let _ = writeln!(out, "    • {}: {}", r.name(), r.message());
        }
    }

    let _ = writeln!(out, "\n  Recommendations:");
    if report.overall_passed() {
        let _ = writeln!(out, "    • Perform final security review");
        let _ = writeln!(out, "    • Schedule deployment window");
        let _ = writeln!(out, "    • Prepare rollback procedures");
    } else {
        if !critical.is_empty() {
            let _ = writeln!(out, "    • Fix {} critical issue(s)", critical.len());
        }
        if report.overall_score() < run.threshold {
            let _ = writeln!(out, "    • Improve overall score from {:.1} to {:.0}+",
                report.overall_score(), run.threshold);
        }
        let _ = writeln!(out, "    • Review failed checks and address root causes");
        let _ = writeln!(out, "    • Re-run the readiness check after fixes");
    }
    out
}

fn icon(r: &CheckResult) -> &'static str {
    match (r.passed(), r.critical()) {
        (true, _)      => "✅",
        (false, true)  => "❌",
        (false, false) => "⚠️ ",
    }
}

// ── 格式化工具 ───────────────────────────────────────────────────────────────

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "─".repeat(60));
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", "─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::utils::Details;

    fn report(results: Vec<CheckResult>) -> ReadinessReport {
        ReadinessReport::build("2026-10-15T09:30:00+00:00", results, &Config::default())
    }

    fn run(path: &Path) -> RunSummary<'_> {
        RunSummary { elapsed: Duration::from_millis(1500), report_path: path, threshold: 70.0 }
    }

    #[test]
    fn lists_critical_failures_and_category_breakdown() {
        let mut details = Details::new();
        details.insert("findings".to_string(), serde_json::json!(3));
        let r = report(vec![
            CheckResult::new("No Hardcoded Secrets", Category::Security, false, 0.0, "Found 3 potential secrets", details, true),
            CheckResult::new("Load Testing", Category::Performance, false, 0.0, "No load testing found", Details::new(), false),
        ]);
        let path = Path::new("report.json");
        let text = render_text(&r, &run(path), false);
        assert!(text.contains("NOT READY"));
        assert!(text.contains("SECURITY CHECKS"));
        assert!(text.contains("Critical issues"));
        assert!(text.contains("• No Hardcoded Secrets: Found 3 potential secrets"));
        assert!(text.contains("• Load Testing: No load testing found"));
        assert!(text.contains("Security"));
        assert!(text.contains("(0/1 passed)"));
        assert!(!text.contains("findings"), "details only in verbose mode");

        let verbose = render_text(&r, &run(path), true);
        assert!(verbose.contains("findings"));
    }

    #[test]
    fn passing_report_recommends_launch_steps() {
        let results = Category::ALL
            .iter()
            .map(|c| CheckResult::new(format!("{} ok", c), *c, true, 100.0, "ok", Details::new(), false))
            .collect();
        let text = render_text(&report(results), &run(Path::new("r.json")), false);
        assert!(text.contains("READY FOR TESTNET"));
        assert!(text.contains("Schedule deployment window"));
        assert!(!text.contains("Critical issues"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(validate_format("yaml").is_err());
        assert!(validate_format("json").is_ok());
    }
}
