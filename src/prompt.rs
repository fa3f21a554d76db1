//! Interactive prompt abstraction shared by every wizard in the crate.
//!
//! All console interaction flows through the [`Prompter`] trait so tests can
//! script responses instead of driving real standard input. The
//! affirmative-response rule lives here as well: every yes/no question in the
//! tool interprets answers through [`is_affirmative`] so no call site can
//! drift to a different convention.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors raised while prompting the interactive operator.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PromptError {
    /// Raised when reading or writing the console fails.
    #[error("console I/O failed: {message}")]
    Io {
        /// Operating system error string.
        message: String,
    },
    /// Raised when the input stream reaches end-of-file mid-conversation.
    #[error("input stream closed before a response was given")]
    Closed,
}

/// Abstraction over interactive text input to support scripted tests.
pub trait Prompter {
    /// Displays `prompt` and reads one line of input, without the trailing
    /// line ending.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Io`] when console I/O fails and
    /// [`PromptError::Closed`] when the input stream has no more lines.
    fn read_line(&self, prompt: &str) -> Result<String, PromptError>;

    /// Writes an informational line to the operator.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Io`] when the output stream cannot be written.
    fn inform(&self, message: &str) -> Result<(), PromptError>;
}

/// Real prompter that talks to the process's standard input and output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn read_line(&self, prompt: &str) -> Result<String, PromptError> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}").map_err(io_error)?;
        stdout.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Err(PromptError::Closed);
        }
        Ok(strip_line_ending(&line))
    }

    fn inform(&self, message: &str) -> Result<(), PromptError> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{message}").map_err(io_error)
    }
}

/// Applies the uniform yes/no rule: an empty answer or a case-insensitive
/// `y` is affirmative, anything else is negative.
#[must_use]
pub fn is_affirmative(response: &str) -> bool {
    let trimmed = response.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("y")
}

fn io_error(err: io::Error) -> PromptError {
    PromptError::Io {
        message: err.to_string(),
    }
}

fn strip_line_ending(line: &str) -> String {
    line.trim_end_matches(['\n', '\r']).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("y", true)]
    #[case("Y", true)]
    #[case("n", false)]
    #[case("no", false)]
    #[case("maybe", false)]
    #[case("N", false)]
    fn affirmative_rule_accepts_empty_and_y_only(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_affirmative(input), expected);
    }

    #[rstest]
    #[case("y\n", "y")]
    #[case("fsn1\r\n", "fsn1")]
    #[case("plain", "plain")]
    fn strip_line_ending_removes_terminators(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_line_ending(input), expected);
    }
}
