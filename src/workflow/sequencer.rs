//! Step sequencer — the linear state machine that runs a contract session.
//!
//! `Intake → Confirm → Draft → Verify → Explain → Synthesize → Done`
//!
//! Each stage calls the model with its template as system prompt and the
//! accumulated history, appends the turn, then waits for user feedback.
//! Synthesis blends the draft, the verification and the late feedback into
//! the final text without touching history. Any failure ends the run.

use tracing::info;

use super::prompts::{self, SYNTHESIS_SYSTEM_PROMPT};
use super::session::Session;
use super::stage::Stage;
use super::templates::TemplateStore;
use super::WorkflowError;
use crate::llm::types::OptionsOverride;
use crate::llm::ChatCompletion;
use crate::term::{self, Notice, Terminal};

/// Where the sequencer is in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stage(Stage),
    Synthesize,
    Done,
}

impl Phase {
    fn after(stage: Stage) -> Phase {
        match stage.next() {
            Some(next) => Phase::Stage(next),
            None => Phase::Synthesize,
        }
    }
}

/// Drives one session through every stage.
pub struct Sequencer<'a> {
    chat: &'a dyn ChatCompletion,
    term: &'a mut dyn Terminal,
    templates: TemplateStore,
    session: Session,
    phase: Phase,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        chat: &'a dyn ChatCompletion,
        term: &'a mut dyn Terminal,
        templates: TemplateStore,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            term,
            templates,
            session: Session::new(prompt),
            phase: Phase::Stage(Stage::Intake),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Advance exactly one state. A finished sequencer stays `Done`.
    pub async fn step(&mut self) -> Result<Phase, WorkflowError> {
        match self.phase {
            Phase::Stage(stage) => {
                self.run_stage(stage).await?;
                self.phase = Phase::after(stage);
            }
            Phase::Synthesize => {
                self.synthesize().await?;
                self.phase = Phase::Done;
            }
            Phase::Done => {}
        }
        Ok(self.phase)
    }

    /// Run every remaining state and hand back the finished session.
    pub async fn run(mut self) -> Result<Session, WorkflowError> {
        while self.phase != Phase::Done {
            self.step().await?;
        }
        Ok(self.session)
    }

    async fn run_stage(&mut self, stage: Stage) -> Result<(), WorkflowError> {
        info!(stage = ?stage, number = stage.number(), "stage started");
        self.term.notify(Notice::StageStarted {
            number: stage.number(),
            total: Stage::ALL.len(),
            label: stage.label(),
        });

        let system = self.templates.system_prompt(stage);
        let user_message = prompts::stage_message(stage, &self.session);
        let response = self
            .chat
            .chat(
                system,
                &user_message,
                self.session.history(),
                &OptionsOverride::default(),
            )
            .await
            .map_err(|source| WorkflowError::Provider {
                phase: stage.label(),
                source,
            })?;

        self.term.notify(Notice::StageResponse {
            label: stage.label(),
            text: &response,
        });
        self.session.record_turn(stage, user_message, response);

        let feedback = term::ask(
            &mut *self.term,
            stage.feedback_question(),
            Some(stage.default_feedback()),
        )?;
        self.session.record_feedback(stage, feedback);

        info!(
            stage = ?stage,
            history = self.session.history().len(),
            "stage completed"
        );
        Ok(())
    }

    async fn synthesize(&mut self) -> Result<(), WorkflowError> {
        info!("synthesizing final contract");
        self.term.notify(Notice::Synthesizing);

        let user_message = prompts::synthesis_message(&self.session);
        let text = self
            .chat
            .chat(
                SYNTHESIS_SYSTEM_PROMPT,
                &user_message,
                self.session.history(),
                &OptionsOverride::default(),
            )
            .await
            .map_err(|source| WorkflowError::Provider {
                phase: "final synthesis",
                source,
            })?;

        self.session.set_final(text);
        Ok(())
    }
}
