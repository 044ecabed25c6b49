//! Operator questions asked during server provisioning.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

/// Something that can answer the provisioner's questions.
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; an empty answer takes `default_yes`.
    fn confirm(&self, question: &str, default_yes: bool) -> Result<bool>;

    /// Ask for a line of free text.
    fn input(&self, question: &str) -> Result<String>;
}

/// Interpret one answer line. `None` means the answer was not understood.
pub fn parse_answer(answer: &str, default_yes: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        "" => Some(default_yes),
        _ => None,
    }
}

/// Asks on the terminal, re-asking until the answer is understood.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(prompt: &str) -> Result<String> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
        drop(stdout);

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read answer from stdin")?;
        if read == 0 {
            bail!("stdin closed while waiting for an answer");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default_yes: bool) -> Result<bool> {
        let choice = if default_yes { " [Y/n]: " } else { " [y/N]: " };
        loop {
            let line = Self::read_line(&format!("{}{}", question, choice))?;
            if let Some(answer) = parse_answer(&line, default_yes) {
                return Ok(answer);
            }
        }
    }

    fn input(&self, question: &str) -> Result<String> {
        Self::read_line(question)
    }
}

/// Answers every confirmation with its default, for runs without a terminal.
///
/// Free-text questions can only be answered when a value was given up front.
#[derive(Debug, Default, Clone)]
pub struct Unattended {
    pub answer: Option<String>,
}

impl Prompter for Unattended {
    fn confirm(&self, question: &str, default_yes: bool) -> Result<bool> {
        tracing::info!("{} -> {}", question.replace('\n', " "), if default_yes { "yes" } else { "no" });
        Ok(default_yes)
    }

    fn input(&self, question: &str) -> Result<String> {
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => bail!("Cannot answer {:?} in unattended mode", question.trim()),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned answers and records every question asked.
    #[derive(Default)]
    pub struct Scripted {
        pub confirms: Mutex<VecDeque<bool>>,
        pub inputs: Mutex<VecDeque<String>>,
        pub asked: Mutex<Vec<String>>,
    }

    impl Scripted {
        pub fn new(confirms: &[bool], inputs: &[&str]) -> Self {
            Self {
                confirms: Mutex::new(confirms.iter().copied().collect()),
                inputs: Mutex::new(inputs.iter().map(|s| s.to_string()).collect()),
                asked: Mutex::new(Vec::new()),
            }
        }

        pub fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    impl Prompter for Scripted {
        fn confirm(&self, question: &str, default_yes: bool) -> Result<bool> {
            self.asked.lock().unwrap().push(question.to_string());
            Ok(self.confirms.lock().unwrap().pop_front().unwrap_or(default_yes))
        }

        fn input(&self, question: &str) -> Result<String> {
            self.asked.lock().unwrap().push(question.to_string());
            self.inputs
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted input for {:?}", question))
        }
    }
}
