//! In-memory record of one contract run.

use std::collections::BTreeMap;

use super::stage::Stage;
use crate::llm::types::Message;

/// What one stage produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub response: String,
    pub feedback: Option<String>,
}

/// Session state for a single invocation.
///
/// History only grows: each completed stage call appends exactly one user
/// and one assistant message.
#[derive(Debug, Clone)]
pub struct Session {
    prompt: String,
    history: Vec<Message>,
    records: BTreeMap<Stage, StageRecord>,
    draft: Option<String>,
    final_text: Option<String>,
}

impl Session {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            history: Vec::new(),
            records: BTreeMap::new(),
            draft: None,
            final_text: None,
        }
    }

    /// The user's original project description.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a completed stage call. The Draft response becomes the draft text.
    pub fn record_turn(&mut self, stage: Stage, user_message: String, response: String) {
        self.history.push(Message::user(user_message));
        self.history.push(Message::assistant(response.clone()));
        if stage == Stage::Draft && self.draft.is_none() {
            self.draft = Some(response.clone());
        }
        self.records.insert(
            stage,
            StageRecord {
                response,
                feedback: None,
            },
        );
    }

    pub fn record_feedback(&mut self, stage: Stage, feedback: String) {
        if let Some(record) = self.records.get_mut(&stage) {
            record.feedback = Some(feedback);
        }
    }

    pub fn record(&self, stage: Stage) -> Option<&StageRecord> {
        self.records.get(&stage)
    }

    /// Response of a completed stage, `""` if it has not run.
    pub fn response(&self, stage: Stage) -> &str {
        self.record(stage).map(|r| r.response.as_str()).unwrap_or("")
    }

    /// Feedback collected after a stage, `""` if none yet.
    pub fn feedback(&self, stage: Stage) -> &str {
        self.record(stage)
            .and_then(|r| r.feedback.as_deref())
            .unwrap_or("")
    }

    /// Number of stages whose call has completed.
    pub fn completed_stages(&self) -> usize {
        self.records.len()
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn final_text(&self) -> Option<&str> {
        self.final_text.as_deref()
    }

    /// Set the synthesized contract. Only the first call takes effect.
    pub fn set_final(&mut self, text: String) {
        if self.final_text.is_none() {
            self.final_text = Some(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Role;

    #[test]
    fn new_session_is_empty() {
        let session = Session::new("Berlin startup");
        assert_eq!(session.prompt(), "Berlin startup");
        assert!(session.history().is_empty());
        assert!(session.draft().is_none());
        assert!(session.final_text().is_none());
        assert_eq!(session.response(Stage::Intake), "");
    }

    #[test]
    fn each_turn_adds_user_then_assistant() {
        let mut session = Session::new("p");
        for (i, stage) in Stage::ALL.into_iter().enumerate() {
            session.record_turn(stage, format!("u{i}"), format!("a{i}"));
            assert_eq!(session.history().len(), 2 * (i + 1));
        }
        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(roles[0], Role::User);
        assert_eq!(roles[1], Role::Assistant);
        assert_eq!(session.history()[9].content, "a4");
        assert_eq!(session.completed_stages(), 5);
    }

    #[test]
    fn draft_comes_from_draft_stage() {
        let mut session = Session::new("p");
        session.record_turn(Stage::Intake, "u".into(), "intake".into());
        assert!(session.draft().is_none());
        session.record_turn(Stage::Draft, "u".into(), "Vertragsentwurf".into());
        assert_eq!(session.draft(), Some("Vertragsentwurf"));
    }

    #[test]
    fn feedback_attaches_to_stage() {
        let mut session = Session::new("p");
        session.record_feedback(Stage::Intake, "ignored".into());
        assert_eq!(session.feedback(Stage::Intake), "");

        session.record_turn(Stage::Intake, "u".into(), "r".into());
        session.record_feedback(Stage::Intake, "passt".into());
        assert_eq!(session.feedback(Stage::Intake), "passt");
        assert_eq!(session.response(Stage::Intake), "r");
    }

    #[test]
    fn final_text_is_set_once() {
        let mut session = Session::new("p");
        session.set_final("first".into());
        session.set_final("second".into());
        assert_eq!(session.final_text(), Some("first"));
    }
}
