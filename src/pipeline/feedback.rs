// src/pipeline/feedback.rs
use once_cell::sync::Lazy;
use regex::Regex;

// The summary block is the only machine-readable part of a validation
// report; everything outside it is free text for humans.
static SUMMARY_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[FEEDBACK_SUMMARY\](.*?)\[END_FEEDBACK_SUMMARY\]")
        .expect("Failed to compile SUMMARY_BLOCK_RE")
});

static ISSUE_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+):\s*(\d+)").expect("Failed to compile ISSUE_COUNT_RE"));

/// Issue count reported for both severities when a report is missing or
/// errored, guaranteeing the acceptance check fails and the section retries.
pub const FORCED_RETRY_COUNT: u32 = 99;

/// Structured issue counts extracted from a validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub critical: u32,
    pub standard: u32,
}

impl FeedbackSummary {
    pub fn clean() -> Self {
        Self {
            critical: 0,
            standard: 0,
        }
    }

    /// Sentinel meaning "the report itself is unusable; never accept".
    pub fn forced_retry() -> Self {
        Self {
            critical: FORCED_RETRY_COUNT,
            standard: FORCED_RETRY_COUNT,
        }
    }

    /// True if both counts are within the configured acceptance thresholds.
    pub fn within(&self, max_critical: u32, max_standard: u32) -> bool {
        self.critical <= max_critical && self.standard <= max_standard
    }
}

/// Extracts issue counts from a validation report.
///
/// An empty report, or one starting with an `ERROR:` sentinel, means the
/// validator itself failed; that parses to the forced-retry sentinel so a
/// corrupt report can never pass validation. Any other report without a
/// summary block, whitespace-only included, parses to zero issues, which
/// downstream treats as accept. Within the block, recognized keys are
/// `critical` and `standard` (case-insensitive); unrecognized keys are
/// ignored.
pub fn parse_feedback(report: &str) -> FeedbackSummary {
    if report.is_empty() || report.trim_start().starts_with("ERROR:") {
        tracing::warn!(
            "Feedback report missing or errored; forcing a retry with {} critical issues",
            FORCED_RETRY_COUNT
        );
        return FeedbackSummary::forced_retry();
    }

    let mut summary = FeedbackSummary::clean();
    let block = match SUMMARY_BLOCK_RE.captures(report).and_then(|c| c.get(1)) {
        Some(block) => block.as_str(),
        None => {
            tracing::warn!("[FEEDBACK_SUMMARY] block not found in report; assuming 0 issues");
            return summary;
        }
    };

    for cap in ISSUE_COUNT_RE.captures_iter(block) {
        let value = match cap[2].parse::<u32>() {
            Ok(v) => v,
            Err(_) => continue, // count too large to represent; ignore the line
        };
        match cap[1].to_lowercase().as_str() {
            "critical" => summary.critical = value,
            "standard" => summary.standard = value,
            _ => {}
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_counts_from_summary_block() {
        let report = "Review notes...\n\
            [FEEDBACK_SUMMARY]\nCritical: 2\nStandard: 5\n[END_FEEDBACK_SUMMARY]\n\
            More prose.";
        assert_eq!(
            parse_feedback(report),
            FeedbackSummary {
                critical: 2,
                standard: 5
            }
        );
    }

    #[test]
    fn test_missing_block_defaults_to_zero_issues() {
        let report = "Looks fine to me. Critical: 7 (outside any block)";
        // Counts outside the delimited block are ignored entirely.
        assert_eq!(parse_feedback(report), FeedbackSummary::clean());
    }

    #[test]
    fn test_empty_report_forces_retry() {
        assert_eq!(parse_feedback(""), FeedbackSummary::forced_retry());
    }

    #[test]
    fn test_whitespace_only_report_defaults_to_zero_issues() {
        // Only a truly empty report is the validator-failure sentinel; a
        // whitespace-only one is just a report with no summary block.
        assert_eq!(parse_feedback("   \n  "), FeedbackSummary::clean());
    }

    #[test]
    fn test_error_sentinel_forces_retry() {
        let report = "ERROR: No source documents found in the specified container.";
        assert_eq!(parse_feedback(report), FeedbackSummary::forced_retry());
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let report = "[FEEDBACK_SUMMARY]\ncritical: 1\ncosmetic: 9\nSTANDARD: 3\n[END_FEEDBACK_SUMMARY]";
        assert_eq!(
            parse_feedback(report),
            FeedbackSummary {
                critical: 1,
                standard: 3
            }
        );
    }

    #[test]
    fn test_within_thresholds() {
        let summary = FeedbackSummary {
            critical: 0,
            standard: 2,
        };
        assert!(summary.within(0, 2));
        assert!(!summary.within(0, 1));
        assert!(!FeedbackSummary::forced_retry().within(0, 0));
    }
}
