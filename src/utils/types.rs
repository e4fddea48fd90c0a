use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 检查结果附带的明细，键有序以保证报告稳定
pub type Details = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Infrastructure,
    Codebase,
    Security,
    Performance,
    Documentation,
    Deployment,
    Monitoring,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Infrastructure,
        Category::Codebase,
        Category::Security,
        Category::Performance,
        Category::Documentation,
        Category::Deployment,
        Category::Monitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Infrastructure => "infrastructure",
            Category::Codebase       => "codebase",
            Category::Security       => "security",
            Category::Performance    => "performance",
            Category::Documentation  => "documentation",
            Category::Deployment     => "deployment",
            Category::Monitoring     => "monitoring",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Infrastructure => "Infrastructure",
            Category::Codebase       => "Codebase",
            Category::Security       => "Security",
            Category::Performance    => "Performance",
            Category::Documentation  => "Documentation",
            Category::Deployment     => "Deployment",
            Category::Monitoring     => "Monitoring",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluated check. Fields are private so a result cannot be edited
/// after the runner builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    name: String,
    category: Category,
    passed: bool,
    score: f64,
    message: String,
    #[serde(default)]
    details: Details,
    critical: bool,
}

impl CheckResult {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        passed: bool,
        score: f64,
        message: impl Into<String>,
        details: Details,
        critical: bool,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            passed,
            score: clamp_score(score),
            message: message.into(),
            details,
            critical,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn category(&self) -> Category { self.category }
    pub fn passed(&self) -> bool { self.passed }
    pub fn score(&self) -> f64 { self.score }
    pub fn message(&self) -> &str { &self.message }
    pub fn details(&self) -> &Details { &self.details }
    pub fn critical(&self) -> bool { self.critical }

    /// Critical and failed: blocks the overall pass.
    pub fn is_blocker(&self) -> bool {
        self.critical && !self.passed
    }
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
