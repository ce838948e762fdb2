//! Input accumulation
//!
//! Raw lines from the line reader become complete logical lines here. A line
//! ending in the continuation marker keeps the accumulator in continuation
//! state and produces nothing; the first line without the marker completes
//! the logical line as the concatenation of every fragment, markers
//! stripped, in order.

/// Trailing character that requests another input line before dispatch.
pub const CONTINUATION_MARKER: char = '\\';

/// Result of feeding one raw line to the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// More input is expected; the caller switches to the continuation
    /// prompt.
    Pending,
    /// A complete logical line. May be empty, in which case the caller
    /// discards it without dispatching.
    Complete(String),
}

/// Two-state machine over raw input lines: normal, or mid-continuation.
#[derive(Debug, Default)]
pub struct InputAccumulator {
    pending: String,
    continuing: bool,
}

impl InputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line; either a logical line comes back or more input is
    /// expected.
    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        match line.strip_suffix(CONTINUATION_MARKER) {
            Some(fragment) => {
                self.pending.push_str(fragment);
                self.continuing = true;
                LineOutcome::Pending
            }
            None => {
                self.pending.push_str(line);
                self.continuing = false;
                LineOutcome::Complete(std::mem::take(&mut self.pending))
            }
        }
    }

    /// True while a continuation is in progress (drives the prompt).
    pub fn is_continuing(&self) -> bool {
        self.continuing
    }

    /// Drop any accumulated input and return to the normal state
    /// (Ctrl-C cancellation).
    pub fn reset(&mut self) {
        self.pending.clear();
        self.continuing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_completes_immediately() {
        let mut acc = InputAccumulator::new();
        assert_eq!(
            acc.push_line("select 1"),
            LineOutcome::Complete("select 1".to_string())
        );
        assert!(!acc.is_continuing());
    }

    #[test]
    fn continuation_concatenates_fragments_in_order() {
        let mut acc = InputAccumulator::new();
        assert_eq!(acc.push_line("select a \\"), LineOutcome::Pending);
        assert!(acc.is_continuing());
        assert_eq!(acc.push_line("from t \\"), LineOutcome::Pending);
        assert_eq!(
            acc.push_line("where a > 1"),
            LineOutcome::Complete("select a from t where a > 1".to_string())
        );
        assert!(!acc.is_continuing());
    }

    #[test]
    fn empty_line_completes_empty() {
        let mut acc = InputAccumulator::new();
        assert_eq!(acc.push_line(""), LineOutcome::Complete(String::new()));
    }

    #[test]
    fn marker_only_line_continues_with_nothing() {
        let mut acc = InputAccumulator::new();
        assert_eq!(acc.push_line("\\"), LineOutcome::Pending);
        assert_eq!(
            acc.push_line("select 1"),
            LineOutcome::Complete("select 1".to_string())
        );
    }

    #[test]
    fn completion_clears_the_buffer_for_the_next_line() {
        let mut acc = InputAccumulator::new();
        acc.push_line("a \\");
        acc.push_line("b");
        assert_eq!(acc.push_line("c"), LineOutcome::Complete("c".to_string()));
    }

    #[test]
    fn reset_discards_pending_input() {
        let mut acc = InputAccumulator::new();
        acc.push_line("select a \\");
        acc.reset();
        assert!(!acc.is_continuing());
        assert_eq!(acc.push_line("x"), LineOutcome::Complete("x".to_string()));
    }
}
