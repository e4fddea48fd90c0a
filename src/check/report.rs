//! 顶层报告结构体与持久化

use crate::check::score;
use crate::config::Config;
use crate::utils::{CheckResult, ReadyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const REPORT_FILE: &str = "TESTNET_READINESS_REPORT.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    timestamp: String,
    overall_passed: bool,
    overall_score: f64,
    results: Vec<CheckResult>,
}

impl ReadinessReport {
    /// Aggregates `results` with the configured weights and threshold.
    pub fn build(timestamp: impl Into<String>, results: Vec<CheckResult>, config: &Config) -> Self {
        let (overall_passed, overall_score) =
            score::evaluate(&results, &config.weights, config.pass_threshold);
        Self {
            timestamp: timestamp.into(),
            overall_passed,
            overall_score,
            results,
        }
    }

    pub fn timestamp(&self) -> &str { &self.timestamp }
    pub fn overall_passed(&self) -> bool { self.overall_passed }
    pub fn overall_score(&self) -> f64 { self.overall_score }
    pub fn results(&self) -> &[CheckResult] { &self.results }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReadyError::Parse(format!("JSON serialize: {}", e)))
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| ReadyError::Parse(format!("report JSON: {}", e)))
    }

    /// Writes the report. Any failure here is fatal for the run.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json + "\n").map_err(|source| ReadyError::Report {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Category, Details};
    use serde_json::json;

    fn sample() -> ReadinessReport {
        let mut details = Details::new();
        details.insert("missing".to_string(), json!(["axionax-web"]));
        details.insert("ratio".to_string(), json!(0.8333333333333334));
        let results = vec![
            CheckResult::new("Repository Structure", Category::Infrastructure, false, 500.0 / 6.0, "5/6 repos found", details, false),
            CheckResult::new("Security Audit Status", Category::Security, true, 100.0, "Found 1 audit report(s)", Details::new(), true),
        ];
        ReadinessReport::build("2026-10-15T09:30:00+00:00", results, &Config::default())
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let report = sample();
        let back = ReadinessReport::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn json_has_expected_shape() {
        let v: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        for k in ["timestamp", "overall_passed", "overall_score", "results"] {
            assert!(keys.contains(&k), "missing {}", k);
        }
        let first = &v["results"][0];
        assert_eq!(first["category"], "infrastructure");
        assert_eq!(first["critical"], false);
        assert_eq!(first["details"]["missing"], json!(["axionax-web"]));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_FILE);
        let report = sample();
        report.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(ReadinessReport::from_json(&content).unwrap(), report);
    }

    #[test]
    fn unwritable_path_is_a_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join(REPORT_FILE);
        let err = sample().save(&path).unwrap_err();
        assert!(matches!(err, ReadyError::Report { .. }));
        assert!(err.to_string().contains("no-such-dir"));
    }

    #[test]
    fn overall_fields_follow_aggregation() {
        let report = sample();
        // infrastructure 83.33 * 0.15 + security 100 * 0.25
        assert!((report.overall_score() - (500.0 / 6.0 * 0.15 + 25.0)).abs() < 1e-9);
        assert!(!report.overall_passed());
    }
}
