use std::io::{self, BufRead, Write};

use crate::diagnostics::Result;

/// Output queue plus the blocking line reader used by terminal methods.
pub struct Console {
    queue: Vec<String>,
    output: Box<dyn Write>,
    input: Box<dyn BufRead>,
}

impl Console {
    pub fn new(output: Box<dyn Write>, input: Box<dyn BufRead>) -> Self {
        Self {
            queue: Vec::new(),
            output,
            input,
        }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::BufReader::new(io::stdin())))
    }

    pub fn enqueue(&mut self, text: impl Into<String>) {
        self.queue.push(text.into());
    }

    /// Writes out everything queued so far.
    pub fn flush(&mut self) -> Result<()> {
        for text in self.queue.drain(..) {
            self.output.write_all(text.as_bytes())?;
            log::debug!("(written to screen) {text:?}");
        }
        self.output.flush()?;
        Ok(())
    }

    /// Blocks for one line; the trailing newline is stripped. End of input
    /// reads as an empty line.
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        log::debug!("(read from screen) {line:?}");
        Ok(line)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}
