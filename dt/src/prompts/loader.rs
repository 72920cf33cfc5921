//! Prompt Loader
//!
//! Loads the system prompt from an override file or falls back to the
//! embedded default.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

use super::embedded;

/// Resolves the system prompt through the loading chain
#[derive(Debug, Clone)]
pub struct PromptLoader {
    explicit: Option<PathBuf>,
    project_dir: PathBuf,
}

impl PromptLoader {
    /// Create a loader rooted at the given project directory
    pub fn new(explicit: Option<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        debug!(?explicit, ?project_dir, "PromptLoader::new: called");
        Self { explicit, project_dir }
    }

    /// Project-local override location
    pub fn project_override(&self) -> PathBuf {
        self.project_dir.join(".deeptok").join("prompts").join("system.pmt")
    }

    /// Load the system prompt
    ///
    /// An explicit path must exist; a missing project override silently
    /// falls through to the embedded prompt.
    pub fn system_prompt(&self) -> Result<String> {
        debug!("PromptLoader::system_prompt: called");
        if let Some(path) = &self.explicit {
            return Self::read(path).context(format!("Failed to load system prompt from {}", path.display()));
        }

        let project = self.project_override();
        if project.exists() {
            debug!(?project, "PromptLoader::system_prompt: project override found");
            return Self::read(&project);
        }

        debug!("PromptLoader::system_prompt: using embedded prompt");
        Ok(embedded::SYSTEM.to_string())
    }

    fn read(path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).context("Failed to read prompt file")?;
        info!("Loaded system prompt from: {}", path.display());
        Ok(content)
    }
}
