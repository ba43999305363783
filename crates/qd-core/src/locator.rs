//! Discovery of already-installed executables.
//!
//! The primary tool is looked up on the executable search path first, then
//! at a fixed, ordered list of well-known install locations. Nothing here is
//! cached: every call re-checks the filesystem.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{expand_home, ToolConfig};

/// Resolved location of the external compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolHandle(PathBuf);

impl ToolHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone)]
pub struct Locator {
    tool: String,
    known_paths: Vec<PathBuf>,
    /// Overrides `PATH` when set.
    search_path: Option<OsString>,
}

impl Locator {
    pub fn new(tool: impl Into<String>, known_paths: Vec<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            known_paths,
            search_path: None,
        }
    }

    /// Build from config. `~/` entries are dropped when no home directory is
    /// known.
    pub fn from_config(cfg: &ToolConfig) -> Self {
        let known_paths = cfg
            .known_paths
            .iter()
            .filter_map(|p| expand_home(p))
            .collect();
        Self::new(cfg.name.clone(), known_paths)
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.tool
    }

    pub fn known_paths(&self) -> &[PathBuf] {
        &self.known_paths
    }

    /// Find the primary tool: search path first, then the well-known files.
    pub fn locate(&self) -> Option<ToolHandle> {
        let found = self.find_program(&self.tool, &self.known_paths)?;
        tracing::debug!(tool = %self.tool, path = %found.display(), "located tool");
        Some(ToolHandle::new(found))
    }

    /// Resolve any program with the same rules as [`locate`](Self::locate).
    ///
    /// `extra` is checked in order after the search path. Missing files and
    /// missing directories are simply skipped.
    pub fn find_program(&self, name: &str, extra: &[PathBuf]) -> Option<PathBuf> {
        if let Some(p) = self.on_search_path(name) {
            return Some(p);
        }
        extra.iter().find(|p| p.is_file()).cloned()
    }

    fn on_search_path(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }
}
