//! 检查契约与检查清单
//!
//! A check is a named, categorised function of the workspace. The runner
//! attaches the critical flag from configuration and turns check errors into
//! failed results, so one broken check never stops the run.

use crate::check::workspace::Workspace;
use crate::check::{codebase, deployment, documentation, infrastructure, monitoring, performance, security};
use crate::utils::{Category, CheckResult, Details, Result};
use serde::Serialize;

// ── Outcome ─────────────────────────────────────────────────────────────────

/// What a check reports before the runner stamps name, category and
/// critical flag onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub passed: bool,
    pub score: f64,
    pub message: String,
    pub details: Details,
}

impl Outcome {
    pub fn new(passed: bool, score: f64, message: impl Into<String>) -> Self {
        Self { passed, score, message: message.into(), details: Details::new() }
    }

    pub fn pass(score: f64, message: impl Into<String>) -> Self {
        Self::new(true, score, message)
    }

    pub fn fail(score: f64, message: impl Into<String>) -> Self {
        Self::new(false, score, message)
    }

    /// Attach a detail entry. Values that fail to serialize are dropped.
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.details.insert(key.to_string(), v);
            }
            Err(e) => tracing::warn!("detail {:?} not serializable: {}", key, e),
        }
        self
    }
}

/// Score `per_item` points per found item (capped at 100), passing once
/// `need` items are found.
pub fn tally(found: Vec<String>, per_item: f64, need: usize, noun: &str, key: &str) -> Outcome {
    let n = found.len();
    let score = (n as f64 * per_item).min(100.0);
    Outcome::new(n >= need, score, format!("{} {}", n, noun)).with(key, found)
}

/// `part / whole` as a percentage; 0 when `whole` is 0.
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ── Check 契约 ──────────────────────────────────────────────────────────────

pub trait Check {
    fn name(&self) -> &'static str;
    fn category(&self) -> Category;
    fn evaluate(&self, ws: &Workspace) -> Result<Outcome>;
}

pub type CheckFn = fn(&Workspace) -> Result<Outcome>;

/// A check backed by a plain function.
#[derive(Clone, Copy)]
pub struct FnCheck {
    pub name: &'static str,
    pub category: Category,
    pub run: CheckFn,
}

impl FnCheck {
    pub const fn new(name: &'static str, category: Category, run: CheckFn) -> Self {
        Self { name, category, run }
    }
}

impl Check for FnCheck {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn evaluate(&self, ws: &Workspace) -> Result<Outcome> {
        (self.run)(ws)
    }
}

// ── 清单 ────────────────────────────────────────────────────────────────────

/// Every registered check, in execution order.
pub fn checklist() -> Vec<Box<dyn Check>> {
    infrastructure::CHECKS
        .iter()
        .chain(codebase::CHECKS.iter())
        .chain(security::CHECKS.iter())
        .chain(performance::CHECKS.iter())
        .chain(documentation::CHECKS.iter())
        .chain(deployment::CHECKS.iter())
        .chain(monitoring::CHECKS.iter())
        .map(|c| Box::new(*c) as Box<dyn Check>)
        .collect()
}

pub fn names(checks: &[Box<dyn Check>]) -> Vec<&'static str> {
    checks.iter().map(|c| c.name()).collect()
}

// ── 执行 ────────────────────────────────────────────────────────────────────

pub fn run_one(check: &dyn Check, ws: &Workspace) -> CheckResult {
    let critical = ws.config().is_critical(check.name());
    tracing::info!(category = %check.category(), "checking {}", check.name());

    let outcome = match check.evaluate(ws) {
        Ok(o) => o,
        Err(e) => {
            tracing::warn!("{} could not run: {}", check.name(), e);
            Outcome::fail(0.0, format!("Check failed: {}", e))
        }
    };

    CheckResult::new(
        check.name(),
        check.category(),
        outcome.passed,
        outcome.score,
        outcome.message,
        outcome.details,
        critical,
    )
}

/// Run checks sequentially, skipping those the config names in `skip`.
pub fn run_all(checks: &[Box<dyn Check>], ws: &Workspace) -> Vec<CheckResult> {
    checks
        .iter()
        .filter(|c| {
            let skipped = ws.config().is_skipped(c.name());
            if skipped {
                tracing::info!("skipping {}", c.name());
            }
            !skipped
        })
        .map(|c| run_one(c.as_ref(), ws))
        .collect()
}
