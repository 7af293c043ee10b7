//! Diagnostics - compile error collection and rendering.
//!
//! The parser never aborts on the first error: diagnostics accumulate in a
//! [`DiagnosticReporter`] and the driver renders them once parsing finishes.
//! Rendering follows the fixed format
//! `"<snippet>\n<file>:<line>:<col>: Error: <message>\n"` where the snippet is
//! up to three source lines with a caret under the offending column.

use serde::{Deserialize, Serialize};

/// A single compile diagnostic, located by line and column (both 1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Render this diagnostic with a source snippet.
    ///
    /// `snippet_lines` are the source lines ending at the offending line
    /// (the caller fetches them from the scanner; at most
    /// [`crate::limits::DIAGNOSTIC_CONTEXT_LINES`]). The caret is placed
    /// under `self.column` of the last snippet line.
    #[must_use]
    pub fn render(&self, snippet_lines: &[&str]) -> String {
        let mut out = String::new();
        for line in snippet_lines {
            out.push_str(line);
            out.push('\n');
        }
        if !snippet_lines.is_empty() {
            for _ in 1..self.column {
                out.push(' ');
            }
            out.push('^');
            out.push('\n');
        }
        out.push_str(&format!(
            "{}:{}:{}: Error: {}\n",
            self.file, self.line, self.column, self.message
        ));
        out
    }
}

/// Collects diagnostics and tracks panic-mode suppression.
///
/// `panic_mode` is set on the first error at a site and cleared by the
/// parser's `synchronize`; while set, further reports are dropped so one
/// syntax error does not cascade. `had_error` is sticky for the whole parse.
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    pub had_error: bool,
    pub panic_mode: bool,
}

impl DiagnosticReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a diagnostic. No-op while in panic mode.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        self.diagnostics.push(diagnostic);
    }

    /// Report without entering panic mode.
    ///
    /// Used for type errors surfaced by placeholder resolution: each
    /// resolution walk is independent and must not suppress the others.
    pub fn report_no_panic(&mut self, diagnostic: Diagnostic) {
        if self.panic_mode {
            return;
        }
        self.had_error = true;
        self.diagnostics.push(diagnostic);
    }

    /// Leave panic mode (called from the parser's `synchronize`).
    pub fn exit_panic_mode(&mut self) {
        self.panic_mode = false;
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;
