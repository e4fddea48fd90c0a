//! 文档类检查

use crate::check::registry::{ratio, tally, FnCheck, Outcome};
use crate::check::workspace::Workspace;
use crate::utils::{Category, Result};
use serde::Serialize;

pub const CHECKS: [FnCheck; 4] = [
    FnCheck::new("Core Documentation", Category::Documentation, core_docs),
    FnCheck::new("API Documentation", Category::Documentation, api_docs),
    FnCheck::new("Deployment Guides", Category::Documentation, deployment_docs),
    FnCheck::new("Examples", Category::Documentation, examples),
];

const CORE_DOCS: [&str; 4] = ["README.md", "ARCHITECTURE.md", "DEVELOPER_GUIDE.md", "CONTRIBUTING.md"];

pub fn core_docs(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let (found, missing): (Vec<&str>, Vec<&str>) = CORE_DOCS
        .iter()
        .copied()
        .partition(|doc| [&r.core, &r.docs].iter().any(|repo| ws.repo(repo).join(doc).exists()));

    if missing.is_empty() {
        return Ok(Outcome::pass(100.0, format!("All {} core docs present", CORE_DOCS.len()))
            .with("docs", found));
    }
    Ok(Outcome::fail(
        ratio(found.len(), CORE_DOCS.len()),
        format!("{}/{} docs", found.len(), CORE_DOCS.len()),
    )
    .with("missing", missing))
}

pub fn api_docs(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let mut docs = Vec::new();
    for repo in [&r.core, &r.docs, &r.sdk] {
        // docs/ 优先
        if let Some(hit) = ws.existing(&[repo], &["docs/API_REFERENCE.md", "API_REFERENCE.md"]).into_iter().next() {
            docs.push(hit);
        }
    }
    Ok(tally(docs, 50.0, 1, "API docs found", "docs"))
}

pub fn deployment_docs(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let docs = ws.existing(
        &[&r.deploy, &r.docs],
        &["DEPLOYMENT_GUIDE.md", "DEPLOYMENT.md", "VPS_VALIDATOR_SETUP.md"],
    );
    Ok(tally(docs, 40.0, 2, "deployment docs", "docs"))
}

#[derive(Debug, Serialize)]
struct ExampleDir {
    repo: String,
    count: usize,
}

pub fn examples(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let mut dirs = Vec::new();

    for repo in [&r.core, &r.sdk] {
        let Ok(entries) = std::fs::read_dir(ws.repo(repo).join("examples")) else { continue };
        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some())
            .count();
        if count > 0 {
            dirs.push(ExampleDir { repo: repo.clone(), count });
        }
    }

    let total: usize = dirs.iter().map(|d| d.count).sum();
    let score = (total as f64 * 15.0).min(100.0);
    Ok(Outcome::new(total >= 4, score, format!("{} examples", total)).with("examples", dirs))
}
