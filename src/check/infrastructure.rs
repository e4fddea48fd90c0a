//! 基础设施类检查
//! 来源：仓库目录、git、本机工具链

use crate::check::registry::{ratio, FnCheck, Outcome};
use crate::check::workspace::Workspace;
use crate::utils::command;
use crate::utils::{Category, Result};
use std::collections::BTreeMap;

pub const CHECKS: [FnCheck; 4] = [
    FnCheck::new("Repository Structure", Category::Infrastructure, repo_structure),
    FnCheck::new("Git Configuration", Category::Infrastructure, git_config),
    FnCheck::new("Dependencies", Category::Infrastructure, dependencies),
    FnCheck::new("Build Tools", Category::Infrastructure, build_tools),
];

// ── 仓库结构 ────────────────────────────────────────────────────────────────

pub fn repo_structure(ws: &Workspace) -> Result<Outcome> {
    let required = ws.repos().required();
    let (found, missing): (Vec<&str>, Vec<&str>) =
        required.iter().copied().partition(|r| ws.repo(r).exists());

    let score = ratio(found.len(), required.len());
    if !missing.is_empty() {
        return Ok(Outcome::fail(score, format!("{}/{} repos found", found.len(), required.len()))
            .with("missing", missing));
    }
    Ok(Outcome::pass(100.0, format!("All {} repos present", required.len())).with("repos", found))
}

// ── git ─────────────────────────────────────────────────────────────────────

pub fn git_config(ws: &Workspace) -> Result<Outcome> {
    let timeout = ws.timeouts().git();

    let rev = command::run("git", &["rev-parse", "--git-dir"], ws.root(), timeout)?;
    if !rev.success() {
        return Ok(Outcome::fail(0.0, "Not a git repository"));
    }

    let status = command::run("git", &["status", "--porcelain"], ws.root(), timeout)?;
    let uncommitted = status.stdout.lines().filter(|l| !l.trim().is_empty()).count();
    if uncommitted > 0 {
        return Ok(Outcome::fail(50.0, format!("{} uncommitted changes", uncommitted))
            .with("uncommitted", uncommitted));
    }
    Ok(Outcome::pass(100.0, "Clean git state"))
}

// ── 工具链 ──────────────────────────────────────────────────────────────────

pub fn dependencies(ws: &Workspace) -> Result<Outcome> {
    let tools = &ws.config().tools;
    let status: BTreeMap<&str, bool> = tools
        .iter()
        .map(|t| (t.as_str(), command::succeeds(t, &["--version"], ws.root(), ws.timeouts().probe())))
        .collect();

    let installed = status.values().filter(|ok| **ok).count();
    let missing: Vec<&str> = tools
        .iter()
        .map(String::as_str)
        .filter(|t| !status.get(t).copied().unwrap_or(false))
        .collect();

    if !missing.is_empty() {
        return Ok(Outcome::fail(ratio(installed, tools.len()), format!("{}/{} dependencies", installed, tools.len()))
            .with("missing", missing));
    }
    Ok(Outcome::pass(100.0, format!("All {} dependencies installed", tools.len())).with("tools", status))
}

pub fn build_tools(ws: &Workspace) -> Result<Outcome> {
    let repos = ws.repos();
    let mut probes: BTreeMap<&str, bool> = BTreeMap::new();

    let core = ws.repo(&repos.core);
    if core.exists() {
        probes.insert("rust_build", command::succeeds("cargo", &["check"], &core, ws.timeouts().build()));
    }

    let sdk = ws.repo(&repos.sdk);
    if sdk.join("package.json").exists() {
        probes.insert("node_build", sdk.join("node_modules").exists());
    }

    let ok = probes.values().filter(|v| **v).count();
    let passed = !probes.is_empty() && ok == probes.len();
    Ok(Outcome::new(
        passed,
        ratio(ok, probes.len().max(1)),
        format!("{}/{} builds OK", ok, probes.len()),
    )
    .with("tools", probes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    fn full_workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::default();
        for repo in cfg.repos.required() {
            fs::create_dir_all(dir.path().join(repo)).unwrap();
        }
        let ws = Workspace::new(dir.path(), cfg);
        (dir, ws)
    }

    #[test]
    fn all_repos_present_scores_full() {
        let (_dir, ws) = full_workspace();
        let o = repo_structure(&ws).unwrap();
        assert!(o.passed);
        assert_eq!(o.score, 100.0);
        assert_eq!(o.message, "All 6 repos present");
    }

    #[test]
    fn one_missing_repo_lowers_score_proportionally() {
        let (dir, ws) = full_workspace();
        fs::remove_dir_all(dir.path().join("axionax-web")).unwrap();
        let o = repo_structure(&ws).unwrap();
        assert!(!o.passed);
        assert!((o.score - 500.0 / 6.0).abs() < 1e-9, "{}", o.score);
        assert_eq!(o.details["missing"], serde_json::json!(["axionax-web"]));
    }

    #[test]
    fn build_tools_without_projects_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path(), Config::default());
        let o = build_tools(&ws).unwrap();
        assert!(!o.passed);
        assert_eq!(o.score, 0.0);
        assert_eq!(o.message, "0/0 builds OK");
    }

    #[test]
    fn node_modules_counts_as_node_build() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = dir.path().join("axionax-sdk-ts");
        fs::create_dir_all(sdk.join("node_modules")).unwrap();
        fs::write(sdk.join("package.json"), "{}").unwrap();
        let ws = Workspace::new(dir.path(), Config::default());
        let o = build_tools(&ws).unwrap();
        assert!(o.passed);
        assert_eq!(o.score, 100.0);
    }

    #[test]
    fn missing_tools_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.tools = vec!["tnready-no-such-tool-a".to_string(), "tnready-no-such-tool-b".to_string()];
        let ws = Workspace::new(dir.path(), cfg);
        let o = dependencies(&ws).unwrap();
        assert!(!o.passed);
        assert_eq!(o.score, 0.0);
        assert_eq!(o.message, "0/2 dependencies");
    }

    #[cfg(unix)]
    fn git(dir: &std::path::Path, args: &[&str]) {
        let ok = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status
            .success();
        assert!(ok, "git {:?} failed", args);
    }

    #[cfg(unix)]
    #[test]
    fn git_state_scores_by_cleanliness() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path(), Config::default());

        let o = git_config(&ws).unwrap();
        assert_eq!((o.passed, o.score), (false, 0.0));
        assert_eq!(o.message, "Not a git repository");

        git(dir.path(), &["init", "-q"]);
        let o = git_config(&ws).unwrap();
        assert!(o.passed, "{}", o.message);
        assert_eq!(o.score, 100.0);

        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        let o = git_config(&ws).unwrap();
        assert_eq!((o.passed, o.score), (false, 50.0));
        assert_eq!(o.message, "2 uncommitted changes");
        assert_eq!(o.details["uncommitted"], 2);
    }
}
