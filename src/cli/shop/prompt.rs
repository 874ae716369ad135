use std::collections::VecDeque;
use std::io::BufRead;

use anyhow::{Context, Result};
use console::Term;

/// The shopper closed stdin or the script ran out of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputClosed;

impl std::fmt::Display for InputClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input closed")
    }
}

impl std::error::Error for InputClosed {}

/// Line based conversation with the shopper.
pub trait Prompt {
    fn say(&mut self, text: &str) -> Result<()>;

    /// Shows `prompt` and reads one trimmed line.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Like [`Prompt::ask`], without echoing the answer where possible.
    fn ask_secret(&mut self, prompt: &str) -> Result<String> {
        self.ask(prompt)
    }
}

pub struct TermPrompt {
    term: Term,
}

impl TermPrompt {
    pub fn new() -> TermPrompt {
        TermPrompt {
            term: Term::stdout(),
        }
    }
}

impl Default for TermPrompt {
    fn default() -> Self {
        TermPrompt::new()
    }
}

impl Prompt for TermPrompt {
    fn say(&mut self, text: &str) -> Result<()> {
        self.term.write_line(text)?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.term.write_str(prompt)?;
        self.term.flush()?;
        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("could not read from stdin")?;
        if read == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim().to_owned())
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String> {
        if !self.term.is_term() {
            return self.ask(prompt);
        }
        self.term.write_str(prompt)?;
        let line = self.term.read_secure_line()?;
        Ok(line.trim().to_owned())
    }
}

/// Answers questions from a fixed script and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> ScriptedPrompt
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: vec![],
        }
    }

    pub fn transcript(&self) -> String {
        self.transcript.join("\n")
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn say(&mut self, text: &str) -> Result<()> {
        self.transcript
            .push(console::strip_ansi_codes(text).into_owned());
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.say(prompt)?;
        match self.answers.pop_front() {
            Some(answer) => Ok(answer.trim().to_owned()),
            None => Err(InputClosed.into()),
        }
    }
}
