//! Asking the operator whether to bundle a dependency.

use crate::Error;
use inquire::{Confirm, InquireError};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Bundle,
    Skip,
}

/// What came back from one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompted {
    Decided(Decision),
    /// The operator abandoned the current root artifact
    Interrupted,
}

pub trait Prompter {
    /// Ask about one dependency, identified by its reference text.
    fn decide(&mut self, reference: &str) -> Result<Prompted, Error>;

    /// Called after an interruption, before the next root's first prompt.
    fn reset(&mut self) {}
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn decide(&mut self, reference: &str) -> Result<Prompted, Error> {
        (**self).decide(reference)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Parse a typed answer; `None` for anything that is not y/yes/n/no.
pub fn parse_answer(answer: &str) -> Option<Decision> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Decision::Bundle),
        "n" | "no" => Some(Decision::Skip),
        _ => None,
    }
}

/// Interactive terminal prompt. Ctrl+C or Esc interrupts the current root.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn decide(&mut self, reference: &str) -> Result<Prompted, Error> {
        let answer = Confirm::new(&format!("Found dependency: {}\n  Bundle this library?", reference))
            .with_help_message("y/n, or Ctrl+C to skip the current input file")
            .prompt();

        match answer {
            Ok(true) => Ok(Prompted::Decided(Decision::Bundle)),
            Ok(false) => Ok(Prompted::Decided(Decision::Skip)),
            Err(InquireError::OperationInterrupted | InquireError::OperationCanceled) => {
                Ok(Prompted::Interrupted)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn reset(&mut self) {
        discard_pending_input();
    }
}

/// Drop keystrokes typed ahead so they cannot answer the next prompt.
#[cfg(unix)]
fn discard_pending_input() {
    // Failure only means stdin is not a terminal, where there is nothing to drop.
    unsafe {
        libc::tcflush(libc::STDIN_FILENO, libc::TCIOFLUSH);
    }
}

#[cfg(not(unix))]
fn discard_pending_input() {}

/// Line-oriented prompt for piped input, e.g. `yes n | dylib-bundle ...`.
///
/// Invalid answers are rejected and asked again; end of input interrupts
/// the current root.
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn decide(&mut self, reference: &str) -> Result<Prompted, Error> {
        loop {
            write!(
                self.output,
                "  -> Found dependency: {}\n     Bundle this library? (y/n): ",
                reference
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Prompted::Interrupted);
            }

            match parse_answer(&line) {
                Some(decision) => return Ok(Prompted::Decided(decision)),
                None => writeln!(self.output, "Invalid input. Please enter 'y' or 'n'.")?,
            }
        }
    }
}
