//! Host I/O for the builtin functions.
//!
//! The core depends on exactly three operations: write a line, read a line
//! behind a prompt, clear the screen. Implement `Console` to capture or
//! redirect them; `StdConsole` talks to the real terminal.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write as _},
};

/// The host I/O surface consumed by `andika`, `soma`, `somaNambari`, `futa`.
pub trait Console {
    /// Writes `text` followed by a newline.
    fn write_line(&mut self, text: &str);

    /// Writes `prompt` (no newline), then reads one line of input without
    /// its trailing newline. Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Clears the terminal screen.
    fn clear_screen(&mut self);
}

/// `Console` backed by the process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, text: &str) {
        println!("{text}");
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }

    fn clear_screen(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }
}

/// `Console` with scripted input and collected output, for tests and
/// programmatic embedding.
#[derive(Debug, Default)]
pub struct CollectConsole {
    inputs: VecDeque<String>,
    output: String,
}

impl CollectConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues lines to be served by `read_line`, in order.
    #[must_use]
    pub fn with_input(lines: &[&str]) -> Self {
        Self {
            inputs: lines.iter().map(|l| (*l).to_owned()).collect(),
            output: String::new(),
        }
    }

    /// Everything written so far, prompts included.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }
}

impl Console for CollectConsole {
    fn write_line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.output.push_str(prompt);
        self.inputs.pop_front()
    }

    fn clear_screen(&mut self) {
        // a cleared screen shows nothing collected before it
        self.output.clear();
    }
}

/// `Console` that discards output and reports end of input immediately.
#[derive(Debug, Default)]
pub struct NoConsole;

impl Console for NoConsole {
    fn write_line(&mut self, _text: &str) {}

    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        None
    }

    fn clear_screen(&mut self) {}
}
