//! Line-oriented prompts for the interactive wizard

use std::io::{BufRead, Write};

use super::error::CliError;

/// Asks questions on `output` and reads answers from `input`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output writer
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print a line
    pub fn say(&mut self, text: impl AsRef<str>) -> Result<(), CliError> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    /// Read one trimmed answer; end of input cancels
    fn read_answer(&mut self) -> Result<String, CliError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    /// Ask a question; an empty answer takes `default`
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String, CliError> {
        match default {
            Some(d) if !d.is_empty() => write!(self.output, "{} [{}]: ", question, d)?,
            _ => write!(self.output, "{}: ", question)?,
        }
        let answer = self.read_answer()?;
        Ok(match (answer.is_empty(), default) {
            (true, Some(d)) => d.to_string(),
            _ => answer,
        })
    }

    /// Ask until a non-empty answer is given
    pub fn ask_required(&mut self, question: &str) -> Result<String, CliError> {
        loop {
            let answer = self.ask(question, None)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.say("  A value is required.")?;
        }
    }

    /// Yes/no question
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool, CliError> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "{} [{}]: ", question, hint)?;
            let answer = self.read_answer()?.to_lowercase();
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" | "s" | "si" | "sí" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("  Please answer y or n.")?,
            }
        }
    }

    /// Pick one of `count` numbered options (1-based); returns the 0-based index
    ///
    /// Any other answer is returned as `Err(answer)` for the caller to
    /// interpret (a key pasted directly, for example).
    pub fn choose(
        &mut self,
        question: &str,
        count: usize,
    ) -> Result<Result<usize, String>, CliError> {
        let answer = self.ask_required(question)?;
        Ok(match answer.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
            _ => Err(answer),
        })
    }
}
