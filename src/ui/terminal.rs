//! Terminal UI implementation.

use console::style;

use super::{OutputMode, UserInterface};

/// Console-backed UI. Status goes to stdout, warnings and errors to
/// stderr regardless of output mode.
#[derive(Debug)]
pub struct TerminalUI {
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI with the given output mode.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

/// Create the UI for the current invocation.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{} {}", style("✓").green().bold(), msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{} {}", style("!").yellow().bold(), style(msg).yellow());
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{} {}", style("✗").red().bold(), style(msg).red());
    }
}
