//! 运行配置：权重、及格线、关键检查、仓库布局、超时
//! 来源：<workspace>/readiness.toml（可选），缺省字段取默认值

use crate::utils::{Category, ReadyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "readiness.toml";
pub const DEFAULT_PASS_THRESHOLD: f64 = 70.0;
pub const DEFAULT_CRITICAL: [&str; 3] = [
    "No Hardcoded Secrets",
    "Dependency Vulnerabilities",
    "Security Audit Status",
];

// ── 数据结构 ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub pass_threshold: f64,
    pub critical: Vec<String>,
    pub skip: Vec<String>,
    pub python: String,
    pub tools: Vec<String>,
    pub weights: CategoryWeights,
    pub repos: RepoLayout,
    pub timeouts: Timeouts,
}

/// Percentage weight per category. Must add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryWeights {
    pub infrastructure: u32,
    pub codebase: u32,
    pub security: u32,
    pub performance: u32,
    pub documentation: u32,
    pub deployment: u32,
    pub monitoring: u32,
}

/// Directory names of the sibling repositories, by role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoLayout {
    pub core: String,
    pub sdk: String,
    pub web: String,
    pub docs: String,
    pub deploy: String,
    pub devtools: String,
    pub marketplace: String,
}

/// Seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    pub probe: u64,
    pub git: u64,
    pub analyzer: u64,
    pub tests: u64,
    pub audit: u64,
    pub build: u64,
}

// ── 默认值 ──────────────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            critical: DEFAULT_CRITICAL.iter().map(|s| s.to_string()).collect(),
            skip: Vec::new(),
            python: "python3".to_string(),
            tools: ["rustc", "cargo", "node", "npm", "python", "docker"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            weights: CategoryWeights::default(),
            repos: RepoLayout::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            infrastructure: 15,
            codebase: 20,
            security: 25,
            performance: 15,
            documentation: 10,
            deployment: 10,
            monitoring: 5,
        }
    }
}

impl Default for RepoLayout {
    fn default() -> Self {
        Self {
            core: "axionax-core".to_string(),
            sdk: "axionax-sdk-ts".to_string(),
            web: "axionax-web".to_string(),
            docs: "axionax-docs".to_string(),
            deploy: "axionax-deploy".to_string(),
            devtools: "axionax-devtools".to_string(),
            marketplace: "axionax-marketplace".to_string(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { probe: 10, git: 5, analyzer: 60, tests: 120, audit: 60, build: 300 }
    }
}

// ── 权重 ────────────────────────────────────────────────────────────────────

impl CategoryWeights {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Infrastructure => self.infrastructure,
            Category::Codebase       => self.codebase,
            Category::Security       => self.security,
            Category::Performance    => self.performance,
            Category::Documentation  => self.documentation,
            Category::Deployment     => self.deployment,
            Category::Monitoring     => self.monitoring,
        }
    }

    pub fn total(&self) -> u32 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        let total = self.total();
        if total != 100 {
            return Err(ReadyError::Config(format!(
                "category weights must sum to 100, got {}",
                total
            )));
        }
        Ok(())
    }
}

impl RepoLayout {
    /// Repositories that must exist for the workspace to be complete.
    pub fn required(&self) -> [&str; 6] {
        [
            self.core.as_str(),
            self.sdk.as_str(),
            self.web.as_str(),
            self.docs.as_str(),
            self.deploy.as_str(),
            self.devtools.as_str(),
        ]
    }
}

impl Timeouts {
    pub fn probe(&self) -> Duration { Duration::from_secs(self.probe) }
    pub fn git(&self) -> Duration { Duration::from_secs(self.git) }
    pub fn analyzer(&self) -> Duration { Duration::from_secs(self.analyzer) }
    pub fn tests(&self) -> Duration { Duration::from_secs(self.tests) }
    pub fn audit(&self) -> Duration { Duration::from_secs(self.audit) }
    pub fn build(&self) -> Duration { Duration::from_secs(self.build) }

    fn validate(&self) -> Result<()> {
        let all = [
            ("probe", self.probe),
            ("git", self.git),
            ("analyzer", self.analyzer),
            ("tests", self.tests),
            ("audit", self.audit),
            ("build", self.build),
        ];
        for (name, secs) in all {
            if secs == 0 {
                return Err(ReadyError::Config(format!("timeouts.{} must be at least 1 second", name)));
            }
        }
        Ok(())
    }
}

// ── 加载与校验 ──────────────────────────────────────────────────────────────

impl Config {
    /// Explicit path must exist; otherwise `<root>/readiness.toml` is used
    /// when present, else defaults.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
                    return Ok(Config::default());
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ReadyError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        tracing::info!("loaded config from {}", path.display());
        Self::from_toml(&content)
            .map_err(|e| ReadyError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ReadyError::Config(e.to_string()))
    }

    /// Startup validation. `known_checks` are the registered check names,
    /// used only to warn about typos in `critical` and `skip`.
    pub fn validate(&self, known_checks: &[&str]) -> Result<()> {
        self.weights.validate()?;
        if !(0.0..=100.0).contains(&self.pass_threshold) {
            return Err(ReadyError::Config(format!(
                "pass_threshold must be within 0..=100, got {}",
                self.pass_threshold
            )));
        }
        self.timeouts.validate()?;

        if let Some(name) = self.critical.iter().find(|c| self.is_skipped(c)) {
            return Err(ReadyError::Config(format!(
                "critical check {:?} cannot be skipped",
                name
            )));
        }

        for name in self.critical.iter().chain(self.skip.iter()) {
            if !known_checks.contains(&name.as_str()) {
                tracing::warn!("config names unknown check {:?}", name);
            }
        }
        Ok(())
    }

    pub fn is_critical(&self, check: &str) -> bool {
        self.critical.iter().any(|c| c == check)
    }

    pub fn is_skipped(&self, check: &str) -> bool {
        self.skip.iter().any(|c| c == check)
    }
}
