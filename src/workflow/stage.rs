//! The five fixed conversation stages.

/// One step of the contract conversation, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Intake,
    Confirm,
    Draft,
    Verify,
    Explain,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Intake,
        Stage::Confirm,
        Stage::Draft,
        Stage::Verify,
        Stage::Explain,
    ];

    /// File in the template directory holding this stage's system prompt.
    pub fn template_file(self) -> &'static str {
        match self {
            Stage::Intake => "intake.txt",
            Stage::Confirm => "confirm_specs.txt",
            Stage::Draft => "draft.txt",
            Stage::Verify => "verify.txt",
            Stage::Explain => "explain.txt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Intake => "Analyzing project requirements",
            Stage::Confirm => "Confirming contract specifications",
            Stage::Draft => "Drafting the contract",
            Stage::Verify => "Verifying the draft",
            Stage::Explain => "Explaining the contract",
        }
    }

    pub fn feedback_question(self) -> &'static str {
        match self {
            Stage::Intake => "Anything to add or correct in the requirements?",
            Stage::Confirm => "Do the specifications look right?",
            Stage::Draft => "Any changes you want in the draft?",
            Stage::Verify => "How should the verification findings be handled?",
            Stage::Explain => "Any final remarks before the contract is finalized?",
        }
    }

    /// Answer used when the user just presses Enter.
    pub fn default_feedback(self) -> &'static str {
        match self {
            Stage::Intake => "The requirements are complete, please continue.",
            Stage::Confirm => "The specifications are correct, please proceed with the draft.",
            Stage::Draft => "The draft looks good, please verify it.",
            Stage::Verify => "Please apply all recommended corrections.",
            Stage::Explain => "No further remarks, please finalize the contract.",
        }
    }

    /// 1-based position in the run.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.number()).copied()
    }
}
