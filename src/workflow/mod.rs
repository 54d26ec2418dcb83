//! Contract workflow — five stages, one synthesis, one saved file.
//!
//! ## Architecture
//!
//! - `stage`: the fixed stage list (template file, label, default feedback)
//! - `templates`: system prompts read from the template directory
//! - `session`: prompt, history, per-stage responses and feedback
//! - `prompts`: labelled user messages and the synthesis prompt
//! - `sequencer`: the linear state machine driving a run
//! - `output`: writing the final contract

pub mod output;
pub mod prompts;
pub mod sequencer;
pub mod session;
pub mod stage;
pub mod templates;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::llm::client::LlmError;
use crate::llm::ChatCompletion;
use crate::term::{self, PromptError, Terminal};

use sequencer::Sequencer;
use session::Session;
use templates::TemplateStore;

/// Question asked when no project description was given.
pub const PROJECT_QUESTION: &str = "Describe the project (client, scope, duration, rate):";

/// Errors that end a contract run.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("template directory not found: {path}")]
    TemplateDir { path: PathBuf },

    #[error("cannot read template {path}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("provider call failed while {phase}")]
    Provider {
        phase: &'static str,
        source: LlmError,
    },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("no final contract to save; the generation pipeline has not completed")]
    NoFinalContract,

    #[error("cannot write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Run a whole contract session.
///
/// Templates are loaded before anything else, so a missing file fails the
/// run before the user is asked for a description or the model is called.
/// A blank or absent `prompt` is asked for on the terminal.
pub async fn generate_contract(
    chat: &dyn ChatCompletion,
    term: &mut dyn Terminal,
    template_dir: &Path,
    prompt: Option<String>,
) -> Result<Session, WorkflowError> {
    let templates = TemplateStore::open(template_dir)?;
    info!(dir = %template_dir.display(), "templates loaded");

    let prompt = match prompt.filter(|p| !p.trim().is_empty()) {
        Some(prompt) => prompt,
        None => term::ask(&mut *term, PROJECT_QUESTION, None)?,
    };

    Sequencer::new(chat, term, templates, prompt).run().await
}
