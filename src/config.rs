//! Go toolchain environment.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

/// Locations the package loader searches outside the current module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoEnv {
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub gomodcache: Option<PathBuf>,
}

impl GoEnv {
    /// Reads `GOROOT`, `GOPATH` and `GOMODCACHE`.
    ///
    /// `GOROOT` falls back to `go env GOROOT`; `GOPATH` to `$HOME/go`.
    pub fn from_env() -> Self {
        let goroot = non_empty_var("GOROOT")
            .map(PathBuf::from)
            .or_else(probe_goroot);

        let mut gopath: Vec<PathBuf> = non_empty_var("GOPATH")
            .map(|v| env::split_paths(&v).filter(|p| !p.as_os_str().is_empty()).collect())
            .unwrap_or_default();
        if gopath.is_empty() {
            if let Some(home) = non_empty_var("HOME") {
                gopath.push(PathBuf::from(home).join("go"));
            }
        }

        let gomodcache = non_empty_var("GOMODCACHE").map(PathBuf::from);

        let env = Self {
            goroot,
            gopath,
            gomodcache,
        };
        debug!(?env, "go environment");
        env
    }

    /// Module cache root: `GOMODCACHE`, else `<first GOPATH>/pkg/mod`.
    pub fn modcache(&self) -> Option<PathBuf> {
        self.gomodcache
            .clone()
            .or_else(|| self.gopath.first().map(|p| p.join("pkg").join("mod")))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn probe_goroot() -> Option<PathBuf> {
    let out = Command::new("go").args(["env", "GOROOT"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let root = String::from_utf8(out.stdout).ok()?;
    let root = root.trim();
    (!root.is_empty()).then(|| PathBuf::from(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modcache_defaults_under_gopath() {
        let env = GoEnv {
            goroot: None,
            gopath: vec![PathBuf::from("/gp")],
            gomodcache: None,
        };
        assert_eq!(env.modcache(), Some(PathBuf::from("/gp/pkg/mod")));

        let env = GoEnv {
            gomodcache: Some(PathBuf::from("/cache")),
            ..env
        };
        assert_eq!(env.modcache(), Some(PathBuf::from("/cache")));
    }
}
