use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    diagnostics::{AuroraError, Result},
    runtime::Interpreter,
    token::Token,
};

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    /// Reads lines until `:quit`, `:exit`, Ctrl-C or end of input. Fatal
    /// errors are reported and the session keeps going.
    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        loop {
            match editor.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if !trimmed.is_empty() {
                        editor.add_history_entry(trimmed).ok();
                    }
                    match self.interpreter.run_line(trimmed) {
                        Ok(Token::Null) => {}
                        Ok(value) => println!("{}", value.repr()),
                        Err(AuroraError::Diagnostic(diag)) => eprintln!("[ERROR] {diag}"),
                        Err(other) => eprintln!("[ERROR] {other}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(readline_error(err)),
            }
        }
        Ok(())
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn readline_error(err: ReadlineError) -> AuroraError {
    AuroraError::from(std::io::Error::other(err))
}
