//! The operator's text console.

use std::io::{self, BufRead, Write};

/// Line-oriented operator I/O.
pub trait Console {
    /// Shows `prompt` and reads one line, without its terminator.
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying streams.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Writes one line of output.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying stream.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// A console over any reader and writer.
#[derive(Debug)]
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    /// Creates a console.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the output stream.
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// Consumes the console, returning the output stream.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// The process's stdin and stdout.
pub type StdConsole = LineConsole<io::StdinLock<'static>, io::Stdout>;

impl StdConsole {
    /// Locks stdin for the life of the console.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}
