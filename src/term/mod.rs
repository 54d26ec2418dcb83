//! Terminal interaction — questions, masked secrets, and progress notices.
//!
//! The workflow only sees the `Terminal` trait. `Console` is the real
//! implementation on stdin/stdout; tests script answers instead.

pub mod input_line;

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event};
use crossterm::style::Stylize;
use crossterm::terminal;

use input_line::{InputLine, LineAction};

/// Characters of the final contract shown before saving.
pub const PREVIEW_CHARS: usize = 500;

/// Errors from terminal prompts.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("terminal I/O failed")]
    Io(#[from] io::Error),

    #[error("input closed while waiting for an answer")]
    Closed,
}

/// Progress the workflow reports while it runs.
#[derive(Debug, Clone, Copy)]
pub enum Notice<'a> {
    StageStarted {
        number: usize,
        total: usize,
        label: &'a str,
    },
    StageResponse {
        label: &'a str,
        text: &'a str,
    },
    Synthesizing,
    /// A blank answer was rejected and the question is asked again.
    Rejected,
}

/// Line-oriented terminal used by the workflow.
pub trait Terminal {
    /// Read one raw answer line. `None` means input is closed.
    fn read_line(&mut self, question: &str, default: Option<&str>) -> io::Result<Option<String>>;

    /// Read one line without echoing it.
    fn read_secret(&mut self, question: &str) -> io::Result<Option<String>>;

    fn notify(&mut self, _notice: Notice<'_>) {}
}

/// Decide what a raw answer line means.
///
/// Empty input takes the default (if any). Input that is blank after
/// trimming is rejected (`None`). Anything else is returned unmodified,
/// minus the line terminator.
pub fn accept_answer(raw: &str, default: Option<&str>) -> Option<String> {
    let line = raw.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return default
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string);
    }
    if line.trim().is_empty() {
        return None;
    }
    Some(line.to_string())
}

/// Ask until the answer is acceptable.
pub fn ask(
    term: &mut dyn Terminal,
    question: &str,
    default: Option<&str>,
) -> Result<String, PromptError> {
    loop {
        let raw = term
            .read_line(question, default)?
            .ok_or(PromptError::Closed)?;
        match accept_answer(&raw, default) {
            Some(answer) => return Ok(answer),
            None => term.notify(Notice::Rejected),
        }
    }
}

/// Ask for a secret until a non-blank one is given. The answer is trimmed.
pub fn ask_secret(term: &mut dyn Terminal, question: &str) -> Result<String, PromptError> {
    loop {
        let raw = term.read_secret(question)?.ok_or(PromptError::Closed)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            term.notify(Notice::Rejected);
            continue;
        }
        return Ok(trimmed.to_string());
    }
}

/// Interactive console on stdin/stdout.
#[derive(Debug, Default)]
pub struct Console;

impl Console {
    pub fn new() -> Self {
        Self
    }

    fn print_question(question: &str, default: Option<&str>) -> io::Result<()> {
        let mut out = io::stdout();
        write!(out, "{} {}", "?".green().bold(), question.bold())?;
        if let Some(default) = default {
            write!(out, " {}", format!("[{}]", short(default, 60)).dark_grey())?;
        }
        write!(out, " ")?;
        out.flush()
    }
}

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Terminal for Console {
    fn read_line(&mut self, question: &str, default: Option<&str>) -> io::Result<Option<String>> {
        Self::print_question(question, default)?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn read_secret(&mut self, question: &str) -> io::Result<Option<String>> {
        if !io::stdin().is_terminal() {
            return self.read_line(question, None);
        }

        Self::print_question(question, None)?;
        let mut out = io::stdout();
        let mut line = InputLine::new();
        let action = {
            let _raw = RawModeGuard::enable()?;
            loop {
                if let Event::Key(key) = event::read()? {
                    let before = line.len();
                    match line.handle_key(key) {
                        LineAction::Continue => {
                            let after = line.len();
                            if after > before {
                                write!(out, "{}", "*".repeat(after - before))?;
                            } else if after < before {
                                write!(out, "{}", "\u{8} \u{8}".repeat(before - after))?;
                            }
                            out.flush()?;
                        }
                        other => break other,
                    }
                }
            }
        };
        writeln!(out)?;

        match action {
            LineAction::Abort => Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "secret prompt aborted",
            )),
            _ => Ok(Some(line.take())),
        }
    }

    fn notify(&mut self, notice: Notice<'_>) {
        match notice {
            Notice::StageStarted {
                number,
                total,
                label,
            } => {
                println!();
                println!(
                    "{} {}",
                    format!("[{number}/{total}]").cyan().bold(),
                    label.bold()
                );
            }
            Notice::StageResponse { label, text } => {
                println!("{}", format!("── {label} ──").dark_cyan());
                println!("{text}");
                println!();
            }
            Notice::Synthesizing => {
                println!();
                println!("{}", "Generating the final contract...".cyan().bold());
            }
            Notice::Rejected => {
                println!("{}", "Please enter a non-empty answer.".yellow());
            }
        }
    }
}

/// Banner shown by the interactive command.
pub fn print_banner() {
    println!("{}", "═".repeat(60).dark_cyan());
    println!("{}", "  Freelance contract assistant".bold());
    println!("  Intake → Confirm → Draft → Verify → Explain");
    println!("  Answer each question; press Enter to accept the default.");
    println!("{}", "═".repeat(60).dark_cyan());
}

/// Preview of the saved contract plus confirmation.
pub fn print_saved(text: &str, path: &std::path::Path) {
    println!();
    println!("{}", "Preview:".bold());
    println!("{}", short(text, PREVIEW_CHARS));
    println!();
    println!(
        "{} {}",
        "Contract saved to".green().bold(),
        path.display()
    );
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn short(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Terminal that answers from a script and records what it was asked.
    #[derive(Debug, Default)]
    pub struct ScriptedTerminal {
        pub answers: VecDeque<String>,
        pub secrets: VecDeque<String>,
        pub questions: Vec<String>,
        pub rejections: usize,
        pub stages_started: Vec<String>,
    }

    impl ScriptedTerminal {
        pub fn with_answers<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }
    }

    impl Terminal for ScriptedTerminal {
        fn read_line(
            &mut self,
            question: &str,
            _default: Option<&str>,
        ) -> io::Result<Option<String>> {
            self.questions.push(question.to_string());
            Ok(self.answers.pop_front())
        }

        fn read_secret(&mut self, question: &str) -> io::Result<Option<String>> {
            self.questions.push(question.to_string());
            Ok(self.secrets.pop_front())
        }

        fn notify(&mut self, notice: Notice<'_>) {
            match notice {
                Notice::Rejected => self.rejections += 1,
                Notice::StageStarted { label, .. } => self.stages_started.push(label.into()),
                _ => {}
            }
        }
    }
}
