//! Progress reporting for long-running operations

/// Receives position updates from signature and delta operations.
pub trait ProgressReporter {
    /// Report that `operation` has processed `current` of `total` units.
    fn report(&mut self, operation: &str, current: u64, total: u64);
}

/// Reporter that discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopProgressReporter;

impl ProgressReporter for NopProgressReporter {
    fn report(&mut self, _operation: &str, _current: u64, _total: u64) {}
}

/// Reporter printing `"<operation>: <percent>%"` to stdout each time the
/// rounded percentage lands on a fresh multiple of ten. Changing operation
/// resets the milestone tracking.
#[derive(Debug)]
pub struct StdoutProgressReporter {
    current_operation: String,
    last_percent: i64,
}

impl StdoutProgressReporter {
    /// Create a reporter with no milestones printed yet.
    pub fn new() -> Self {
        Self {
            current_operation: String::new(),
            last_percent: -1,
        }
    }

    /// Milestone bookkeeping, separated out so the print decision is testable.
    fn milestone(&mut self, operation: &str, current: u64, total: u64) -> Option<i64> {
        if total == 0 {
            return None;
        }
        let percent = (current as f64 / total as f64 * 100.0 + 0.5) as i64;
        if self.current_operation != operation {
            self.last_percent = -1;
            self.current_operation = operation.to_string();
        }
        if self.last_percent != percent && percent % 10 == 0 {
            self.last_percent = percent;
            Some(percent)
        } else {
            None
        }
    }
}

impl ProgressReporter for StdoutProgressReporter {
    fn report(&mut self, operation: &str, current: u64, total: u64) {
        if let Some(percent) = self.milestone(operation, current, total) {
            println!("{}: {}%", self.current_operation, percent);
        }
    }
}

impl Default for StdoutProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_each_multiple_of_ten_once() {
        let mut reporter = StdoutProgressReporter::new();
        let mut printed = Vec::new();
        for current in 0..=100 {
            if let Some(p) = reporter.milestone("Building delta", current, 100) {
                printed.push(p);
            }
        }
        assert_eq!(printed, vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn repeated_positions_do_not_reprint() {
        let mut reporter = StdoutProgressReporter::new();
        assert_eq!(reporter.milestone("op", 50, 100), Some(50));
        assert_eq!(reporter.milestone("op", 50, 100), None);
    }

    #[test]
    fn operation_change_resets_milestones() {
        let mut reporter = StdoutProgressReporter::new();
        assert_eq!(reporter.milestone("first", 100, 100), Some(100));
        assert_eq!(reporter.milestone("second", 100, 100), Some(100));
    }

    #[test]
    fn zero_total_is_silent() {
        let mut reporter = StdoutProgressReporter::new();
        assert_eq!(reporter.milestone("op", 0, 0), None);
    }
}
