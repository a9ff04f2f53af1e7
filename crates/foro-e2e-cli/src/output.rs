//! Report rendering.

use foro_e2e::SuiteReport;

/// Render a suite report to stdout
pub fn print_report(report: &SuiteReport) {
    println!(
        "\nsuite '{}': {} passed, {} failed ({} total) in {:.1}s",
        report.suite_name,
        report.passed_count(),
        report.failed_count(),
        report.total(),
        report.duration.as_secs_f64(),
    );

    for result in &report.results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!(
            "  [{status}] {} ({:.1}s)",
            result.case_id,
            result.duration.as_secs_f64()
        );
        if let Some(error) = &result.error {
            println!("         {error}");
        }
    }
}

/// One-line totals across suites
pub fn print_totals(reports: &[SuiteReport]) {
    let passed: usize = reports.iter().map(SuiteReport::passed_count).sum();
    let failed: usize = reports.iter().map(SuiteReport::failed_count).sum();
    println!("\ntotal: {passed} passed, {failed} failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use foro_e2e::CaseResult;

    #[test]
    fn test_print_does_not_panic() {
        let mut report = SuiteReport::new("register");
        report.record(CaseResult::pass("register_valid_1"));
        report.record(CaseResult::fail("register_valid_2", "toast mismatch"));
        print_report(&report);
        print_totals(&[report]);
    }
}
