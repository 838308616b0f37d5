//! Console sink contract and test helpers.

use parking_lot::Mutex;

/// Line-oriented console output target.
///
/// This is the only contract assumed of the console collaborator: it accepts
/// complete lines. Severity gating and prefixes are applied by the
/// [`Logger`](crate::Logger) before a line reaches the sink.
pub trait ConsoleSink: Send + Sync {
    /// Emit one line (no trailing newline).
    fn line(&self, line: &str);
}

/// In-memory console sink for testing.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<String>>,
}

impl MemoryConsole {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines received so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drop all collected lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl ConsoleSink for MemoryConsole {
    fn line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_console_records_lines() {
        let console = MemoryConsole::new();
        console.line("first");
        console.line("second");

        assert_eq!(console.lines(), vec!["first", "second"]);

        console.clear();
        assert!(console.lines().is_empty());
    }
}
