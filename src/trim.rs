use crate::report::IncidentReport;

/// Hook run on a report after assembly and before the notifier sees it.
///
/// Hooks must be infallible: a malformed report is still worth delivering,
/// so a hook adjusts what it can and leaves the rest alone.
pub trait BeforeNotify: Send + Sync {
    fn before_notify(&self, report: &mut IncidentReport);
}

/// Number of leading frames contributed by the bridge's own call path
/// between stack capture and the logging call site.
pub const DEFAULT_TRIM_COUNT: usize = 3;

/// Removes the bridge's own leading frames from a report's stack trace so
/// the reported crash site points at caller code, not adapter code.
///
/// The count is tied to the call depth of [`crate::bridge::Bridge::write`];
/// refactors that change that depth must update it. Traces shorter than the
/// count truncate to empty rather than failing.
#[derive(Debug, Clone, Copy)]
pub struct StackTrimmer {
    count: usize,
}

impl StackTrimmer {
    pub fn new(count: usize) -> Self {
        StackTrimmer { count }
    }
}

impl Default for StackTrimmer {
    fn default() -> Self {
        StackTrimmer::new(DEFAULT_TRIM_COUNT)
    }
}

impl BeforeNotify for StackTrimmer {
    fn before_notify(&self, report: &mut IncidentReport) {
        report.error.stacktrace.drop_leading(self.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Frame, IncidentReport, ReportedError, Stacktrace};
    use crate::severity::Severity;
    use std::collections::BTreeMap;

    fn report_with_frames(n: usize) -> IncidentReport {
        let frames = (0..n)
            .map(|i| Frame {
                function: Some(format!("fn_{i}")),
                file: None,
                line: None,
            })
            .collect();
        IncidentReport {
            error: ReportedError {
                message: "boom".into(),
                stacktrace: Stacktrace { frames },
            },
            severity: Severity::Error,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn drops_exactly_the_configured_leading_frames() {
        let mut report = report_with_frames(5);
        StackTrimmer::default().before_notify(&mut report);
        assert_eq!(report.error.stacktrace.len(), 2);
        assert_eq!(
            report.error.stacktrace.frames[0].function.as_deref(),
            Some("fn_3")
        );
    }

    #[test]
    fn short_trace_truncates_to_empty_without_failing() {
        let mut report = report_with_frames(2);
        StackTrimmer::default().before_notify(&mut report);
        assert!(report.error.stacktrace.is_empty());
    }

    #[test]
    fn exact_length_trace_also_empties() {
        let mut report = report_with_frames(DEFAULT_TRIM_COUNT);
        StackTrimmer::default().before_notify(&mut report);
        assert!(report.error.stacktrace.is_empty());
    }
}
