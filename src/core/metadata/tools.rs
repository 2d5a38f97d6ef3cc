//! Locating the external ffprobe / ffmpeg executables.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

/// Where to look for external tools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Searched before `PATH`
    pub bin_dir: Option<PathBuf>,
}

impl ToolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(dir.into());
        self
    }

    /// Resolve `tool`: override directory, then `PATH`, then `bin/` beside
    /// the running executable.
    pub fn locate(&self, tool: &'static str) -> Result<PathBuf, ToolError> {
        if let Some(found) = self.bin_dir.as_deref().and_then(|dir| in_dir(dir, tool)) {
            return Ok(found);
        }

        if let Ok(found) = which::which(tool) {
            return Ok(found);
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("bin")))
            .and_then(|dir| in_dir(&dir, tool))
            .ok_or(ToolError::NotFound { tool })
    }
}

fn in_dir(dir: &Path, tool: &str) -> Option<PathBuf> {
    let candidate = dir.join(format!("{}{}", tool, EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}
