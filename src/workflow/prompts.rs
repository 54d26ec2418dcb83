//! User messages for each stage and the synthesis prompt.
//!
//! Every builder is a pure function of its inputs. Sections are labelled so
//! the model can tell the original request from earlier answers and
//! feedback.

use super::session::Session;
use super::stage::Stage;

/// System prompt for the final synthesis call.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "\
You are an expert in drafting German contracts, specialising in freelance \
agreements (Freie-Mitarbeiter-Verträge / Dienstverträge) under German law. \
You write precise, complete contract text in German.";

/// Instructions closing the synthesis message.
const SYNTHESIS_INSTRUCTIONS: &str = "\
Create the final, improved version of the contract. Incorporate every \
correction from the verification and all user feedback above. Keep the \
structure of the draft where it is sound. Respond with the complete \
contract text in German only, without commentary.";

fn push_section(out: &mut String, label: &str, body: &str) {
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(label);
    out.push_str(":\n");
    out.push_str(body);
}

/// Intake: the project description alone.
pub fn build_intake_message(prompt: &str) -> String {
    let mut out = String::new();
    push_section(&mut out, "Project description", prompt);
    out
}

pub fn build_confirm_message(prompt: &str, intake_response: &str, intake_feedback: &str) -> String {
    let mut out = String::new();
    push_section(&mut out, "Original request", prompt);
    push_section(&mut out, "Requirements analysis", intake_response);
    push_section(&mut out, "User feedback", intake_feedback);
    out
}

pub fn build_draft_message(prompt: &str, confirm_response: &str, confirm_feedback: &str) -> String {
    let mut out = String::new();
    push_section(&mut out, "Original request", prompt);
    push_section(&mut out, "Confirmed specifications", confirm_response);
    push_section(&mut out, "User feedback", confirm_feedback);
    out
}

pub fn build_verify_message(prompt: &str, draft: &str, draft_feedback: &str) -> String {
    let mut out = String::new();
    push_section(&mut out, "Original request", prompt);
    push_section(&mut out, "Contract draft", draft);
    push_section(&mut out, "User feedback", draft_feedback);
    out
}

/// Explain sees the draft, not a corrected version, plus the verification.
pub fn build_explain_message(
    prompt: &str,
    draft: &str,
    verify_response: &str,
    verify_feedback: &str,
) -> String {
    let mut out = String::new();
    push_section(&mut out, "Original request", prompt);
    push_section(&mut out, "Contract draft", draft);
    push_section(&mut out, "Verification results", verify_response);
    push_section(&mut out, "User feedback", verify_feedback);
    out
}

pub fn build_synthesis_message(
    draft: &str,
    verify_response: &str,
    verify_feedback: &str,
    explain_feedback: &str,
) -> String {
    let mut out = String::new();
    push_section(&mut out, "Contract draft", draft);
    push_section(&mut out, "Verification results", verify_response);
    push_section(&mut out, "User feedback after verification", verify_feedback);
    push_section(&mut out, "User feedback after explanation", explain_feedback);
    push_section(&mut out, "Task", SYNTHESIS_INSTRUCTIONS);
    out
}

/// User message for `stage`, drawn from what the session holds so far.
pub fn stage_message(stage: Stage, session: &Session) -> String {
    let prompt = session.prompt();
    match stage {
        Stage::Intake => build_intake_message(prompt),
        Stage::Confirm => build_confirm_message(
            prompt,
            session.response(Stage::Intake),
            session.feedback(Stage::Intake),
        ),
        Stage::Draft => build_draft_message(
            prompt,
            session.response(Stage::Confirm),
            session.feedback(Stage::Confirm),
        ),
        Stage::Verify => build_verify_message(
            prompt,
            session.response(Stage::Draft),
            session.feedback(Stage::Draft),
        ),
        Stage::Explain => build_explain_message(
            prompt,
            session.response(Stage::Draft),
            session.response(Stage::Verify),
            session.feedback(Stage::Verify),
        ),
    }
}

/// Synthesis message, drawn from the finished stages.
pub fn synthesis_message(session: &Session) -> String {
    build_synthesis_message(
        session.draft().unwrap_or(""),
        session.response(Stage::Verify),
        session.feedback(Stage::Verify),
        session.feedback(Stage::Explain),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_is_labelled_prompt() {
        assert_eq!(
            build_intake_message("Berlin startup"),
            "Project description:\nBerlin startup"
        );
    }

    #[test]
    fn confirm_builder_is_deterministic() {
        let a = build_confirm_message("p", "INTAKE_OK", "passt");
        let b = build_confirm_message("p", "INTAKE_OK", "passt");
        assert_eq!(a, b);
        assert_eq!(
            a,
            "Original request:\np\n\nRequirements analysis:\nINTAKE_OK\n\nUser feedback:\npasst"
        );
        assert_ne!(a, build_confirm_message("p", "INTAKE_OK", "anders"));
    }

    #[test]
    fn explain_uses_draft_and_verify_only() {
        let mut session = Session::new("p");
        session.record_turn(Stage::Intake, "u".into(), "INTAKE_OK".into());
        session.record_feedback(Stage::Intake, "fb-intake".into());
        session.record_turn(Stage::Confirm, "u".into(), "CONFIRM_OK".into());
        session.record_feedback(Stage::Confirm, "fb-confirm".into());
        session.record_turn(Stage::Draft, "u".into(), "DRAFT_TEXT".into());
        session.record_feedback(Stage::Draft, "fb-draft".into());
        session.record_turn(Stage::Verify, "u".into(), "VERIFY_OK".into());
        session.record_feedback(Stage::Verify, "fb-verify".into());

        let msg = stage_message(Stage::Explain, &session);
        assert!(msg.contains("DRAFT_TEXT"));
        assert!(msg.contains("VERIFY_OK"));
        assert!(msg.contains("fb-verify"));
        assert!(!msg.contains("fb-confirm"));
        assert!(!msg.contains("fb-draft"));
        assert!(!msg.contains("CONFIRM_OK"));
    }

    #[test]
    fn each_stage_uses_previous_response() {
        let mut session = Session::new("p");
        session.record_turn(Stage::Intake, "u".into(), "INTAKE_OK".into());
        session.record_feedback(Stage::Intake, "f1".into());
        let confirm = stage_message(Stage::Confirm, &session);
        assert!(confirm.contains("INTAKE_OK") && confirm.contains("f1"));

        session.record_turn(Stage::Confirm, "u".into(), "CONFIRM_OK".into());
        session.record_feedback(Stage::Confirm, "f2".into());
        let draft = stage_message(Stage::Draft, &session);
        assert!(draft.contains("CONFIRM_OK") && draft.contains("f2"));
        assert!(!draft.contains("INTAKE_OK"));

        session.record_turn(Stage::Draft, "u".into(), "DRAFT_TEXT".into());
        session.record_feedback(Stage::Draft, "f3".into());
        let verify = stage_message(Stage::Verify, &session);
        assert!(verify.contains("DRAFT_TEXT") && verify.contains("f3"));
    }

    #[test]
    fn synthesis_embeds_draft_verification_and_feedback() {
        let msg = build_synthesis_message("DRAFT_TEXT", "VERIFY_OK", "fb-v", "fb-e");
        for part in ["DRAFT_TEXT", "VERIFY_OK", "fb-v", "fb-e", "German"] {
            assert!(msg.contains(part), "missing {part}");
        }
        assert!(SYNTHESIS_SYSTEM_PROMPT.contains("German contracts"));
    }
}
