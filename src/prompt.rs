//! Interactive resolution of leaves.
//!
//! [`Prompter`] is the line-input seam; [`TerminalPrompter`] talks to the
//! terminal. The two resolve policies decide when to ask:
//!
//! - [`ReusePolicy`] (normal runs) keeps stored values and only asks for
//!   missing ones.
//! - [`EditPolicy`] asks for every leaf, offering the stored value.
//!
//! Both re-prompt until a numeric leaf gets a number.

use std::io::{BufRead, Write};

use crate::error::PromptenvError;
use crate::types::{Resolution, WalkedLeaf};
use crate::walker::Resolver;

/// Asks the user one question at a time.
pub trait Prompter {
    /// Show `question` and return the line typed in reply, without the line ending.
    fn ask(&mut self, question: &str) -> Result<String, PromptenvError>;

    /// Report a recoverable problem with the last answer.
    fn warn(&mut self, message: &str);
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, question: &str) -> Result<String, PromptenvError> {
        (**self).ask(question)
    }

    fn warn(&mut self, message: &str) {
        (**self).warn(message)
    }
}

/// Prompts on stderr and reads answers from stdin.
///
/// Stdout stays free for exported output.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<String, PromptenvError> {
        let mut stderr = std::io::stderr().lock();
        write!(stderr, "{question}").map_err(PromptenvError::PromptFailed)?;
        stderr.flush().map_err(PromptenvError::PromptFailed)?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(PromptenvError::PromptFailed)?;
        if read == 0 {
            return Err(PromptenvError::PromptInputClosed(question.trim().to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Keep stored values; ask only for leaves without one.
pub struct ReusePolicy<P> {
    prompter: P,
}

impl<P: Prompter> ReusePolicy<P> {
    pub fn new(prompter: P) -> Self {
        Self { prompter }
    }
}

impl<P: Prompter> Resolver for ReusePolicy<P> {
    fn resolve(&mut self, leaf: &WalkedLeaf) -> Result<Resolution, PromptenvError> {
        if let Some(current) = &leaf.current_value {
            return Ok(Resolution::Value(current.clone()));
        }
        let suggestion = leaf.default_value.as_deref();
        let value = ask_until_valid(&mut self.prompter, leaf, suggestion, false)?;
        Ok(Resolution::Value(value.unwrap_or_default()))
    }
}

/// Ask for every leaf, offering the stored value (or the default).
///
/// An empty answer keeps the suggestion; with nothing to suggest it forgets
/// the leaf.
pub struct EditPolicy<P> {
    prompter: P,
}

impl<P: Prompter> EditPolicy<P> {
    pub fn new(prompter: P) -> Self {
        Self { prompter }
    }
}

impl<P: Prompter> Resolver for EditPolicy<P> {
    fn resolve(&mut self, leaf: &WalkedLeaf) -> Result<Resolution, PromptenvError> {
        let suggestion = leaf
            .current_value
            .as_deref()
            .or(leaf.default_value.as_deref());
        let value = ask_until_valid(&mut self.prompter, leaf, suggestion, true)?;
        Ok(match value {
            Some(value) => Resolution::Value(value),
            None => Resolution::Omit,
        })
    }
}

/// Prompt until the answer is acceptable for `leaf`.
///
/// A blank answer becomes `suggestion`. Without a suggestion it is taken as
/// an empty answer, or as `None` when `blank_omits` is set.
fn ask_until_valid<P: Prompter>(
    prompter: &mut P,
    leaf: &WalkedLeaf,
    suggestion: Option<&str>,
    blank_omits: bool,
) -> Result<Option<String>, PromptenvError> {
    let question = question_for(leaf, suggestion);
    loop {
        let answer = prompter.ask(&question)?;
        let answer = answer.trim();

        let candidate = match (answer.is_empty(), suggestion) {
            (true, Some(suggested)) => suggested,
            (true, None) if blank_omits => return Ok(None),
            _ => answer,
        };

        if !leaf.is_number {
            return Ok(Some(candidate.to_string()));
        }
        match normalize_number(candidate) {
            Some(number) => return Ok(Some(number)),
            None => prompter.warn(&format!("{} must be a number", leaf.environment_name)),
        }
    }
}

/// `"{prompt} ({NAME}) [suggestion]: "`
pub fn question_for(leaf: &WalkedLeaf, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(suggested) => format!(
            "{} ({}) [{}]: ",
            leaf.prompt, leaf.environment_name, suggested
        ),
        None => format!("{} ({}): ", leaf.prompt, leaf.environment_name),
    }
}

/// Canonical text form of a numeric answer, or `None` if it is not a number.
///
/// Integral values lose their fractional part and sign of zero:
/// `"05"` → `"5"`, `"1.50"` → `"1.5"`, `"-0"` → `"0"`.
///
/// Only finite decimal literals count. Blank input, infinities and hex
/// literals are rejected so the user is asked again, rather than being
/// coerced to `0`, `Infinity` or a decimal value.
pub fn normalize_number(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let number: f64 = trimmed.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    if number == 0.0 {
        return Some("0".to_string());
    }
    Some(number.to_string())
}
