//! Interactive prompts.
//!
//! Every prompt can end in [`Prompt::Cancelled`] (Esc, Ctrl-C, or no
//! terminal to ask on). Callers treat that as "do nothing", not as a failure.

use anyhow::Result;
use inquire::validator::Validation;
use inquire::{Confirm, InquireError, Select, Text};
use std::io::{self, IsTerminal};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt<T> {
    Answered(T),
    Cancelled,
}

/// Checks a text answer; `Err` carries the message shown under the input.
pub type Validator = fn(&str) -> Result<(), String>;

pub trait Prompter {
    /// Pick one of `choices`; answers with its index.
    fn select(&mut self, message: &str, choices: &[String], default: usize) -> Result<Prompt<usize>>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<Prompt<bool>>;

    /// Free text. An empty answer means `default`; the prompt stays open
    /// until `validate` accepts the value.
    fn text(&mut self, message: &str, default: &str, validate: Validator) -> Result<Prompt<String>>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter {
    page_size: usize,
}

impl TerminalPrompter {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }
}

fn interactive(message: &str) -> bool {
    let tty = io::stdin().is_terminal() && io::stdout().is_terminal();
    if !tty {
        debug!(prompt = message, "no terminal, treating prompt as cancelled");
    }
    tty
}

fn map_inquire_result<T>(result: Result<T, InquireError>) -> Result<Prompt<T>> {
    match result {
        Ok(answer) => Ok(Prompt::Answered(answer)),
        Err(InquireError::OperationCanceled)
        | Err(InquireError::OperationInterrupted)
        | Err(InquireError::NotTTY) => Ok(Prompt::Cancelled),
        Err(other) => Err(anyhow::anyhow!("prompt error: {other}")),
    }
}

fn validation(validate: Validator, input: &str) -> Validation {
    match validate(input) {
        Ok(()) => Validation::Valid,
        Err(message) => Validation::Invalid(message.into()),
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, message: &str, choices: &[String], default: usize) -> Result<Prompt<usize>> {
        if choices.is_empty() || !interactive(message) {
            return Ok(Prompt::Cancelled);
        }
        let picked = Select::new(message, choices.to_vec())
            .with_page_size(self.page_size)
            .with_starting_cursor(default.min(choices.len() - 1))
            .with_help_message("↑↓ to move, type to filter, Enter to select")
            .raw_prompt()
            .map(|option| option.index);
        map_inquire_result(picked)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<Prompt<bool>> {
        if !interactive(message) {
            return Ok(Prompt::Cancelled);
        }
        map_inquire_result(Confirm::new(message).with_default(default).prompt())
    }

    fn text(&mut self, message: &str, default: &str, validate: Validator) -> Result<Prompt<String>> {
        if !interactive(message) {
            return Ok(Prompt::Cancelled);
        }
        let answer = Text::new(message)
            .with_default(default)
            .with_validator(move |input: &str| Ok(validation(validate, input.trim())))
            .prompt()
            .map(|value| value.trim().to_string());
        map_inquire_result(answer)
    }
}
