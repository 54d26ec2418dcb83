//! System-prompt templates loaded from the template directory.
//!
//! All five files are read when the store opens, so a missing template
//! stops the run before the first provider call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::stage::Stage;
use super::WorkflowError;

/// Trimmed system prompts, one per stage.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
    prompts: BTreeMap<Stage, String>,
}

impl TemplateStore {
    /// Read every stage template from `dir`.
    pub fn open(dir: &Path) -> Result<Self, WorkflowError> {
        if !dir.is_dir() {
            return Err(WorkflowError::TemplateDir {
                path: dir.to_path_buf(),
            });
        }

        let mut prompts = BTreeMap::new();
        for stage in Stage::ALL {
            let path = dir.join(stage.template_file());
            let text = std::fs::read_to_string(&path)
                .map_err(|source| WorkflowError::Template { path: path.clone(), source })?;
            let text = text.trim().to_string();
            if text.is_empty() {
                warn!(path = %path.display(), "template is empty");
            }
            debug!(stage = ?stage, chars = text.len(), "template loaded");
            prompts.insert(stage, text);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            prompts,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// System prompt for a stage.
    pub fn system_prompt(&self, stage: Stage) -> &str {
        self.prompts.get(&stage).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Write all five templates into `dir`, each naming its stage.
    pub fn write_templates(dir: &Path) {
        for stage in Stage::ALL {
            std::fs::write(
                dir.join(stage.template_file()),
                format!("\n  SYSTEM {:?}  \n", stage),
            )
            .unwrap();
        }
    }
}
