//! Line-based prompting for interactive mode
//!
//! Reads from any `BufRead` and writes to any `Write`, so the menu can be
//! driven from a terminal or from a test buffer. End of input is reported as
//! `None` rather than an error.

use std::io::{BufRead, Write};

use crate::error::{ExpenseError, ExpenseResult};

/// Prompts the user and reads single-line answers
pub struct Prompter<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
}

impl<'a> Prompter<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }

    /// Write text followed by a newline
    pub fn say(&mut self, text: impl AsRef<str>) -> ExpenseResult<()> {
        writeln!(self.output, "{}", text.as_ref()).map_err(io_error)
    }

    /// Write text as-is
    pub fn print(&mut self, text: impl AsRef<str>) -> ExpenseResult<()> {
        write!(self.output, "{}", text.as_ref()).map_err(io_error)
    }

    /// Show `label` and read one trimmed line; `None` at end of input
    pub fn read_line(&mut self, label: &str) -> ExpenseResult<Option<String>> {
        write!(self.output, "{}: ", label).map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until `parse` accepts the answer
    ///
    /// Validation and not-found errors are shown and the question repeated;
    /// other errors are returned. `None` at end of input.
    pub fn ask<T, F>(&mut self, label: &str, mut parse: F) -> ExpenseResult<Option<T>>
    where
        F: FnMut(&str) -> ExpenseResult<T>,
    {
        loop {
            let Some(answer) = self.read_line(label)? else {
                return Ok(None);
            };

            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) if e.is_validation() || e.is_not_found() => {
                    self.say(format!("  {}", e))?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Ask a yes/no question; anything but "y"/"yes" (or end of input) is no
    pub fn confirm(&mut self, label: &str) -> ExpenseResult<bool> {
        let answer = self.read_line(&format!("{} [y/N]", label))?;
        Ok(matches!(
            answer.as_deref().map(str::to_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }
}

fn io_error(err: std::io::Error) -> ExpenseError {
    ExpenseError::Io(format!("Terminal I/O failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_and_eof() {
        let mut input = Cursor::new("  hello \n");
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output);

        assert_eq!(prompter.read_line("Name").unwrap().as_deref(), Some("hello"));
        assert_eq!(prompter.read_line("Name").unwrap(), None);
        drop(prompter);

        assert_eq!(String::from_utf8(output).unwrap(), "Name: Name: ");
    }

    #[test]
    fn test_ask_repeats_on_validation_error() {
        let mut input = Cursor::new("abc\n-1\n42\n");
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output);

        let value = prompter
            .ask("Number", |s| {
                s.parse::<u32>()
                    .map_err(|_| ExpenseError::Validation(format!("'{}' is not a number", s)))
            })
            .unwrap();
        drop(prompter);

        assert_eq!(value, Some(42));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("'abc' is not a number"));
        assert!(shown.contains("'-1' is not a number"));
    }

    #[test]
    fn test_ask_returns_other_errors() {
        let mut input = Cursor::new("x\n");
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output);

        let result: ExpenseResult<Option<()>> =
            prompter.ask("Value", |_| Err(ExpenseError::Io("disk".into())));
        assert!(matches!(result, Err(ExpenseError::Io(_))));
    }

    #[test]
    fn test_confirm() {
        let mut input = Cursor::new("Y\nno\n");
        let mut output = Vec::new();
        let mut prompter = Prompter::new(&mut input, &mut output);

        assert!(prompter.confirm("Continue?").unwrap());
        assert!(!prompter.confirm("Continue?").unwrap());
        // end of input
        assert!(!prompter.confirm("Continue?").unwrap());
    }
}
