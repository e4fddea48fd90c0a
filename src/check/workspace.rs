//! 工作区句柄：根目录 + 配置，显式传给每个检查

use crate::config::{Config, RepoLayout, Timeouts};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Files larger than this are not read by content scans.
pub const MAX_SCAN_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self { root: root.into(), config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repos(&self) -> &RepoLayout {
        &self.config.repos
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.config.timeouts
    }

    pub fn repo(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path relative to the root, `/`-separated, for reports.
    pub fn rel(&self, path: &Path) -> String {
        let p = path.strip_prefix(&self.root).unwrap_or(path);
        p.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// `<repo>/<file>` for each pair that exists on disk, in argument order.
    pub fn existing<S: AsRef<str>>(&self, repos: &[S], files: &[&str]) -> Vec<String> {
        let mut found = Vec::new();
        for repo in repos {
            for file in files {
                let p = self.repo(repo.as_ref()).join(file);
                if p.exists() {
                    found.push(self.rel(&p));
                }
            }
        }
        found
    }

    /// Every regular file under `dir`, honouring .gitignore and skipping `.git`.
    pub fn files_under(&self, dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .require_git(false)
            .filter_entry(|e| e.file_name() != ".git")
            .build();

        let mut files: Vec<PathBuf> = walker
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::debug!("walk: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// Files anywhere under the root whose file name satisfies `pred`.
    pub fn find_files<F>(&self, pred: F) -> Vec<PathBuf>
    where
        F: Fn(&str) -> bool,
    {
        self.files_under(&self.root)
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(&pred)
                    .unwrap_or(false)
            })
            .collect()
    }
}
