//! Suite run reporting.

use std::time::Duration;

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Scenario case id
    pub case_id: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Failure message, including expected vs. actual toast text
    pub error: Option<String>,
    /// Scenario duration
    pub duration: Duration,
}

impl CaseResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(case_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Aggregated results of a suite run
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// Individual case results
    pub results: Vec<CaseResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteReport {
    /// Create an empty report
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            results: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a case result
    pub fn record(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    /// Whether every case passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count of passed cases
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count of failed cases
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Total case count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// The failing cases
    #[must_use]
    pub fn failures(&self) -> Vec<&CaseResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}
