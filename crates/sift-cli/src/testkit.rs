//! Test doubles for driving commands without a terminal.

use crate::console::Console;
use parking_lot::Mutex;

/// Records everything printed and answers confirmations with a fixed reply.
#[derive(Debug, Default)]
pub struct SpyConsole {
    out: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    answer: bool,
}

impl SpyConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console that answers yes to every confirmation.
    pub fn agreeing() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    pub fn out_lines(&self) -> Vec<String> {
        self.out.lock().clone()
    }

    /// All stdout output joined with newlines.
    pub fn stdout(&self) -> String {
        self.out.lock().join("\n")
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Console for SpyConsole {
    fn out(&self, line: &str) {
        self.out.lock().push(line.to_string());
    }

    fn notice(&self, line: &str) {
        self.notices.lock().push(line.to_string());
    }

    fn warn(&self, line: &str) {
        self.warnings.lock().push(line.to_string());
    }

    fn error(&self, line: &str) {
        self.errors.lock().push(line.to_string());
    }

    fn confirm(&self, _prompt: &str) -> bool {
        self.answer
    }
}
