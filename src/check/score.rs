//! 汇总：分类平均分、加权总分、关键检查门槛

use crate::config::CategoryWeights;
use crate::utils::{Category, CheckResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: f64,
    pub passed: usize,
    pub total: usize,
}

/// Per-category averages, in category order, for categories that have results.
pub fn category_scores(results: &[CheckResult]) -> Vec<CategoryScore> {
    Category::ALL
        .iter()
        .filter_map(|cat| {
            let rs: Vec<&CheckResult> = results.iter().filter(|r| r.category() == *cat).collect();
            if rs.is_empty() {
                return None;
            }
            let sum: f64 = rs.iter().map(|r| r.score()).sum();
            Some(CategoryScore {
                category: *cat,
                score: sum / rs.len() as f64,
                passed: rs.iter().filter(|r| r.passed()).count(),
                total: rs.len(),
            })
        })
        .collect()
}

/// Σ category average × weight / 100. Categories without results add 0.
pub fn overall_score(results: &[CheckResult], weights: &CategoryWeights) -> f64 {
    category_scores(results)
        .iter()
        .map(|c| c.score * weights.get(c.category) as f64 / 100.0)
        .sum()
}

pub fn critical_failures(results: &[CheckResult]) -> Vec<&CheckResult> {
    results.iter().filter(|r| r.is_blocker()).collect()
}

/// `(overall_passed, overall_score)`. A failed critical check fails the run
/// whatever the score; no results at all is `(false, 0)`.
pub fn evaluate(results: &[CheckResult], weights: &CategoryWeights, threshold: f64) -> (bool, f64) {
    if results.is_empty() {
        return (false, 0.0);
    }
    let score = overall_score(results, weights);
    let passed = score >= threshold && critical_failures(results).is_empty();
    (passed, score)
}
