use std::io::Write;

/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so tests can
/// capture what a command reports.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Stopping db...")
    fn status(&self, message: &str);

    /// Success message (e.g., "Database is ready")
    fn success(&self, message: &str);

    /// Machine-consumable result on stdout (artifact paths, JSON)
    fn data(&self, message: &str);

    /// Inline progress (no trailing newline). Call `finish_progress` after.
    fn progress(&self, message: &str);

    /// Finish an inline progress line with a result.
    fn finish_progress(&self, result: &str);
}

/// Standard CLI output. Human-oriented messages go to stderr so stdout carries
/// only data.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn success(&self, message: &str) {
        eprintln!("\x1b[32m{}\x1b[0m", message);
    }

    fn data(&self, message: &str) {
        println!("{}", message);
    }

    fn progress(&self, message: &str) {
        eprint!("{}", message);
        std::io::stderr().flush().ok();
    }

    fn finish_progress(&self, result: &str) {
        eprintln!("{}", result);
    }
}

/// Records every message. Used by command tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingOutput {
    lines: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingOutput {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }

    fn push(&self, kind: &str, message: &str) {
        self.lines.lock().push(format!("{}: {}", kind, message));
    }
}

#[cfg(test)]
impl UserOutput for RecordingOutput {
    fn status(&self, message: &str) {
        self.push("status", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn data(&self, message: &str) {
        self.push("data", message);
    }
    fn progress(&self, message: &str) {
        self.push("progress", message);
    }
    fn finish_progress(&self, result: &str) {
        self.push("done", result);
    }
}
