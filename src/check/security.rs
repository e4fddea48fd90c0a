//! 安全类检查（前三项默认为关键检查）
//! 来源：源码文本扫描、npm audit、审计报告文件、.gitignore

use crate::check::registry::{tally, FnCheck, Outcome};
use crate::check::workspace::{Workspace, MAX_SCAN_BYTES};
use crate::utils::command;
use crate::utils::{Category, ReadyError, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::path::Path;

pub const CHECKS: [FnCheck; 4] = [
    FnCheck::new("No Hardcoded Secrets", Category::Security, secrets),
    FnCheck::new("Dependency Vulnerabilities", Category::Security, vulnerabilities),
    FnCheck::new("Security Audit Status", Category::Security, audit_status),
    FnCheck::new("Access Controls", Category::Security, access_controls),
];

pub const SECRET_PATTERNS: [&str; 5] = [
    r#"password\s*=\s*["']"#,
    r#"api[_-]?key\s*=\s*["']"#,
    r#"secret\s*=\s*["']"#,
    r#"token\s*=\s*["']"#,
    r#"private[_-]?key\s*=\s*["']"#,
];

/// A hit whose `path:line:text` contains any of these is not a finding:
/// examples, docs, generated configs, setup scripts taking CLI args,
/// archived trees and placeholder text.
pub const SECRET_EXCLUDES: [&str; 15] = [
    ".env.example",
    "example",
    "README",
    "DEPLOYMENT_REPORT",
    "docker-compose",
    "setup_testnet.ps1",
    "full_setup.ps1",
    "setup_faucet.sh",
    "setup_explorer.sh",
    "setup_validator.sh",
    "setup_rpc_node.sh",
    "monorepo-archive",
    "your_private_key",
    "Axionax_v1.5",
    "Axionax_v1.6",
];

/// Empty values and env-var references.
const SAFE_ASSIGNMENTS: [&str; 3] = ["=\"\"", "=${", "=\"$"];

const AUDIT_REPORTS: [&str; 3] = ["SECURITY_AUDIT.md", "AUDIT_REPORT.md", "SECURITY_REVIEW.md"];

// ── 硬编码密钥 ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecretFinding {
    pub repo: String,
    pub pattern: String,
    pub matches: usize,
    pub sample: String,
}

pub fn secrets(ws: &Workspace) -> Result<Outcome> {
    let patterns = compile_patterns()?;
    let r = ws.repos();

    let mut findings = Vec::new();
    for repo in [&r.core, &r.sdk, &r.web, &r.deploy, &r.devtools] {
        let path = ws.repo(repo);
        if path.exists() {
            findings.extend(scan_repo(ws, repo, &path, &patterns));
        }
    }

    if !findings.is_empty() {
        return Ok(Outcome::fail(0.0, format!("Found {} potential secrets", findings.len()))
            .with("findings", findings));
    }
    Ok(Outcome::pass(100.0, "No hardcoded secrets detected"))
}

fn compile_patterns() -> Result<Vec<(&'static str, Regex)>> {
    SECRET_PATTERNS
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map(|re| (*p, re))
                .map_err(|e| ReadyError::Parse(format!("secret pattern {}: {}", p, e)))
        })
        .collect()
}

/// One finding per pattern that has at least one suspicious line in the repo.
fn scan_repo(
    ws: &Workspace,
    repo: &str,
    path: &Path,
    patterns: &[(&'static str, Regex)],
) -> Vec<SecretFinding> {
    let mut hits: Vec<Vec<String>> = vec![Vec::new(); patterns.len()];

    for file in ws.files_under(path) {
        let Some(content) = read_text(&file) else { continue };
        let rel = ws.rel(&file);

        for (lineno, line) in content.lines().enumerate() {
            for (i, (_, re)) in patterns.iter().enumerate() {
                if !re.is_match(line) {
                    continue;
                }
                let hit = format!("{}:{}:{}", rel, lineno + 1, line.trim());
                if is_suspicious(&hit) {
                    hits[i].push(hit);
                }
            }
        }
    }

    patterns
        .iter()
        .zip(hits)
        .filter(|(_, lines)| !lines.is_empty())
        .map(|((pattern, _), lines)| SecretFinding {
            repo: repo.to_string(),
            pattern: pattern.to_string(),
            matches: lines.len(),
            sample: lines[0].clone(),
        })
        .collect()
}

pub fn is_suspicious(hit: &str) -> bool {
    if SECRET_EXCLUDES.iter().any(|e| hit.contains(e)) {
        return false;
    }
    !SAFE_ASSIGNMENTS.iter().any(|s| hit.contains(s))
}

/// UTF-8 text no larger than the scan limit; anything else is skipped.
fn read_text(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > MAX_SCAN_BYTES {
        tracing::debug!("skipping large file {}", path.display());
        return None;
    }
    std::fs::read_to_string(path).ok()
}

// ── npm audit ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerableRepo {
    pub repo: String,
    pub critical: u64,
    pub high: u64,
}

pub fn vulnerabilities(ws: &Workspace) -> Result<Outcome> {
    audit_with(ws, "npm")
}

fn audit_with(ws: &Workspace, npm: &str) -> Result<Outcome> {
    let r = ws.repos();
    let mut vulnerable = Vec::new();
    let mut audited = 0usize;

    for repo in [&r.sdk, &r.web, &r.marketplace] {
        let path = ws.repo(repo);
        if !path.join("package.json").exists() {
            continue;
        }
        audited += 1;

        // npm audit exits non-zero when it finds anything; only stdout matters
        let out = command::run(npm, &["audit", "--json"], &path, ws.timeouts().audit())?;
        let (critical, high) = parse_audit(&out.stdout)
            .map_err(|e| ReadyError::Parse(format!("npm audit in {}: {}", repo, e)))?;
        if critical > 0 || high > 0 {
            vulnerable.push(VulnerableRepo { repo: repo.clone(), critical, high });
        }
    }

    if !vulnerable.is_empty() {
        return Ok(Outcome::fail(30.0, format!("{} repos with vulnerabilities", vulnerable.len()))
            .with("vulnerable", vulnerable));
    }
    if audited == 0 {
        return Ok(Outcome::pass(100.0, "No npm projects to audit"));
    }
    Ok(Outcome::pass(100.0, "No critical vulnerabilities found").with("audited", audited))
}

/// `(critical, high)` counts from `npm audit --json` output.
pub fn parse_audit(stdout: &str) -> std::result::Result<(u64, u64), String> {
    let data: serde_json::Value = serde_json::from_str(stdout).map_err(|e| e.to_string())?;
    if !data.is_object() {
        return Err("expected a JSON object".to_string());
    }
    let count = |sev: &str| {
        data.pointer(&format!("/metadata/vulnerabilities/{}", sev))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0)
    };
    Ok((count("critical"), count("high")))
}

// ── 审计报告 / 访问控制 ─────────────────────────────────────────────────────

pub fn audit_status(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let mut audits = Vec::new();
    for file in AUDIT_REPORTS {
        audits.extend(ws.existing(&[&r.core, &r.docs], &[file]));
    }

    if audits.is_empty() {
        return Ok(Outcome::fail(0.0, "No security audit report found"));
    }
    Ok(Outcome::pass(100.0, format!("Found {} audit report(s)", audits.len())).with("audits", audits))
}

pub fn access_controls(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let configs = ws.existing(&[&r.core, &r.sdk, &r.web, &r.deploy], &[".gitignore"]);
    Ok(tally(configs, 25.0, 4, "access configs", "configs"))
}
