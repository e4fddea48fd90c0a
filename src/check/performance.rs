//! 性能类检查：基准、构建优化、压测

use crate::check::registry::{tally, FnCheck, Outcome};
use crate::check::workspace::Workspace;
use crate::utils::{Category, ReadyError, Result};

pub const CHECKS: [FnCheck; 3] = [
    FnCheck::new("Benchmark Suite", Category::Performance, benchmarks),
    FnCheck::new("Build Optimization", Category::Performance, optimization),
    FnCheck::new("Load Testing", Category::Performance, load_testing),
];

pub fn benchmarks(ws: &Workspace) -> Result<Outcome> {
    let benches = ws.repo(&ws.repos().core).join("benches");
    let bench_files: Vec<String> = match std::fs::read_dir(&benches) {
        Ok(entries) => {
            let mut files: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().map(|x| x == "rs").unwrap_or(false))
                .map(|p| ws.rel(&p))
                .collect();
            files.sort();
            files
        }
        Err(_) => Vec::new(),
    };
    let results = ws.find_files(|name| name.starts_with("benchmark_results."));

    let total = bench_files.len() + results.len();
    let score = (total as f64 * 25.0).min(100.0);
    if total >= 2 {
        return Ok(Outcome::pass(score, format!("{} benchmark files found", total))
            .with("bench_files", bench_files)
            .with("results", results.iter().map(|p| ws.rel(p)).collect::<Vec<_>>()));
    }
    Ok(Outcome::fail(score, format!("Only {} benchmark files", total)))
}

pub fn optimization(ws: &Workspace) -> Result<Outcome> {
    let r = ws.repos();
    let mut found = Vec::new();

    let cargo = ws.repo(&r.core).join("Cargo.toml");
    if cargo.exists() {
        let content = std::fs::read_to_string(&cargo)?;
        if release_opt_level_3(&content).map_err(|e| ReadyError::Parse(format!("{}: {}", ws.rel(&cargo), e)))? {
            found.push("rust_release_profile".to_string());
        }
    }

    for repo in [&r.sdk, &r.web] {
        let tsconfig = ws.repo(repo).join("tsconfig.json");
        if let Ok(content) = std::fs::read_to_string(&tsconfig) {
            if content.contains("ES2021") || content.contains("ESNext") {
                found.push(format!("{}_tsconfig", repo));
            }
        }
    }

    Ok(tally(found, 30.0, 3, "optimizations", "optimizations"))
}

/// `[profile.release] opt-level = 3` in a Cargo manifest.
pub fn release_opt_level_3(manifest: &str) -> std::result::Result<bool, toml::de::Error> {
    let doc: toml::Table = toml::from_str(manifest)?;
    let level = doc
        .get("profile")
        .and_then(|p| p.get("release"))
        .and_then(|r| r.get("opt-level"));
    Ok(matches!(level, Some(toml::Value::Integer(3))))
}

pub fn load_testing(ws: &Workspace) -> Result<Outcome> {
    let files: Vec<String> = ws
        .find_files(|name| name.starts_with("load_test"))
        .iter()
        .map(|p| ws.rel(p))
        .collect();
    if files.is_empty() {
        return Ok(Outcome::fail(0.0, "No load testing found"));
    }
    Ok(Outcome::pass(100.0, format!("{} load test files", files.len())).with("files", files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;

    #[test]
    fn opt_level_is_read_from_release_profile() {
        assert!(release_opt_level_3("[profile.release]\nopt-level = 3\nlto = true\n").unwrap());
        assert!(!release_opt_level_3("[profile.release]\nopt-level = \"z\"\n").unwrap());
        assert!(!release_opt_level_3("[profile.dev]\nopt-level = 3\n").unwrap());
        assert!(release_opt_level_3("[profile.release\nopt-level = 3").is_err());
    }

    #[test]
    fn malformed_cargo_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let core = dir.path().join("axionax-core");
        fs::create_dir_all(&core).unwrap();
        fs::write(core.join("Cargo.toml"), "[package\nname = ").unwrap();
        let ws = Workspace::new(dir.path(), Config::default());
        assert!(matches!(optimization(&ws), Err(ReadyError::Parse(_))));
    }

    #[test]
    fn all_three_optimizations_pass() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for repo in ["axionax-core", "axionax-sdk-ts", "axionax-web"] {
            fs::create_dir_all(root.join(repo)).unwrap();
        }
        fs::write(root.join("axionax-core/Cargo.toml"), "[profile.release]\nopt-level = 3\n").unwrap();
        fs::write(root.join("axionax-sdk-ts/tsconfig.json"), r#"{"compilerOptions":{"target":"ES2021"}}"#).unwrap();
        fs::write(root.join("axionax-web/tsconfig.json"), r#"{"compilerOptions":{"target":"ESNext"}}"#).unwrap();

        let ws = Workspace::new(root, Config::default());
        let o = optimization(&ws).unwrap();
        assert!(o.passed);
        assert_eq!(o.score, 90.0);
    }

    #[test]
    fn benches_and_results_are_counted_together() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("axionax-core/benches")).unwrap();
        fs::write(root.join("axionax-core/benches/consensus.rs"), "").unwrap();
        fs::create_dir_all(root.join("reports")).unwrap();
        fs::write(root.join("reports/benchmark_results.json"), "{}").unwrap();

        let ws = Workspace::new(root, Config::default());
        let o = benchmarks(&ws).unwrap();
        assert!(o.passed);
        assert_eq!(o.score, 50.0);
        assert_eq!(o.details["bench_files"], serde_json::json!(["axionax-core/benches/consensus.rs"]));
    }

    #[test]
    fn load_test_files_anywhere_count() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path(), Config::default());
        assert!(!load_testing(&ws).unwrap().passed);

        fs::create_dir_all(dir.path().join("axionax-deploy/scripts")).unwrap();
        fs::write(dir.path().join("axionax-deploy/scripts/load_test_rpc.js"), "").unwrap();
        let o = load_testing(&ws).unwrap();
        assert!(o.passed);
        assert_eq!(o.details["files"], serde_json::json!(["axionax-deploy/scripts/load_test_rpc.js"]));
    }
}
