use anyhow::{Context, Result};
use dialoguer::console::Term;
use dialoguer::Input;
use std::fmt::Display;

/// Question/answer channel used by the interactive flow.
pub trait Prompt {
    /// Asks `question` and returns the raw answer. Empty answers are allowed.
    fn ask(&mut self, question: &str) -> Result<String>;
    fn say(&mut self, message: impl Display) -> Result<()>;
}

/// Prompts on the terminal. The terminal handle is released when the session
/// is dropped.
pub struct TermSession {
    term: Term,
}

impl TermSession {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Prompt for TermSession {
    fn ask(&mut self, question: &str) -> Result<String> {
        // dialoguer appends the ": " itself.
        let label = question.trim_end().trim_end_matches(':');
        Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text_on(&self.term)
            .with_context(|| format!("could not read answer to: {label}"))
    }

    fn say(&mut self, message: impl Display) -> Result<()> {
        self.term
            .write_line(&message.to_string())
            .context("could not write output")
    }
}
