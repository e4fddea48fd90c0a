//! 监控类检查：日志依赖、指标配置、健康检查端点

use crate::check::registry::{tally, FnCheck, Outcome};
use crate::check::workspace::{Workspace, MAX_SCAN_BYTES};
use crate::utils::{Category, ReadyError, Result};

pub const CHECKS: [FnCheck; 3] = [
    FnCheck::new("Logging Configuration", Category::Monitoring, logging),
    FnCheck::new("Metrics Collection", Category::Monitoring, metrics),
    FnCheck::new("Health Checks", Category::Monitoring, health_endpoints),
];

const RUST_LOG_CRATES: [&str; 5] = ["log", "tracing", "tracing-subscriber", "env_logger", "slog"];
const NODE_LOG_PACKAGES: [&str; 2] = ["winston", "pino"];

// ── 日志 ────────────────────────────────────────────────────────────────────

pub fn logging(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let mut configs = Vec::new();

    for repo in [&r.core, &r.web] {
        let path = ws.repo(repo);
        if !path.exists() {
            continue;
        }

        let cargo = path.join("Cargo.toml");
        if cargo.exists() {
            let content = std::fs::read_to_string(&cargo)?;
            let deps = cargo_dependencies(&content)
                .map_err(|e| ReadyError::Parse(format!("{}: {}", ws.rel(&cargo), e)))?;
            if deps.iter().any(|d| RUST_LOG_CRATES.contains(&d.as_str())) {
                configs.push(format!("{}/Cargo.toml (logging)", repo));
            }
        }

        let package = path.join("package.json");
        if package.exists() {
            let content = std::fs::read_to_string(&package)?;
            let deps = npm_dependencies(&content)
                .map_err(|e| ReadyError::Parse(format!("{}: {}", ws.rel(&package), e)))?;
            if deps.iter().any(|d| NODE_LOG_PACKAGES.contains(&d.as_str())) {
                configs.push(format!("{}/package.json (logging)", repo));
            }
        }
    }

    Ok(tally(configs, 50.0, 1, "logging configs", "configs"))
}

/// Dependency names from `[dependencies]`, `[workspace.dependencies]`,
/// `[dev-dependencies]` and `[target.*.dependencies]`.
pub fn cargo_dependencies(manifest: &str) -> std::result::Result<Vec<String>, toml::de::Error> {
    let doc: toml::Table = toml::from_str(manifest)?;
    let mut names = Vec::new();

    let mut collect = |table: Option<&toml::Value>| {
        if let Some(t) = table.and_then(toml::Value::as_table) {
            names.extend(t.keys().cloned());
        }
    };
    collect(doc.get("dependencies"));
    collect(doc.get("dev-dependencies"));
    collect(doc.get("workspace").and_then(|w| w.get("dependencies")));
    if let Some(targets) = doc.get("target").and_then(toml::Value::as_table) {
        for t in targets.values() {
            collect(t.get("dependencies"));
        }
    }
    Ok(names)
}

/// Package names from `dependencies` and `devDependencies`.
pub fn npm_dependencies(manifest: &str) -> std::result::Result<Vec<String>, serde_json::Error> {
    let doc: serde_json::Value = serde_json::from_str(manifest)?;
    let mut names = Vec::new();
    for key in ["dependencies", "devDependencies"] {
        if let Some(obj) = doc.get(key).and_then(serde_json::Value::as_object) {
            names.extend(obj.keys().cloned());
        }
    }
    Ok(names)
}

// ── 指标 / 健康检查 ─────────────────────────────────────────────────────────

pub fn metrics(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let files = ws.existing(
        &[&r.core, &r.deploy],
        &["prometheus.yml", "metrics.toml", "grafana-dashboard.json"],
    );
    if files.is_empty() {
        return Ok(Outcome::fail(0.0, "No metrics configuration"));
    }
    Ok(tally(files, 50.0, 1, "metrics configs", "files"))
}

pub fn health_endpoints(ws: &Workspace) -> Result<Outcome> {
    let src = ws.repo(&ws.repos().core).join("src");

    // 找到第一个即可
    let endpoint = ws
        .files_under(&src)
        .into_iter()
        .filter(|p| p.extension().map(|e| e == "rs").unwrap_or(false))
        .find(|p| {
            std::fs::metadata(p).map(|m| m.len() <= MAX_SCAN_BYTES).unwrap_or(false)
                && std::fs::read(p)
                    .map(|b| {
                        let text = String::from_utf8_lossy(&b);
                        text.contains("/health") || text.contains("health_check")
                    })
                    .unwrap_or(false)
        })
        .map(|p| ws.rel(&p));

    Ok(tally(endpoint.into_iter().collect(), 100.0, 1, "health endpoints", "endpoints"))
}
