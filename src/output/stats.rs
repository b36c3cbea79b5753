//! Run statistics
//!
//! This module summarizes a finished harvest for display at the end of a run.

use crate::api::CallStats;
use crate::harvest::HarvestReport;

/// Harvest run statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestStatistics {
    /// Number of groups walked
    pub groups: usize,

    /// Total number of posts collected
    pub posts: usize,

    /// Posts kept by the question filter
    pub questions: usize,

    /// Comments collected under kept posts
    pub comments: usize,

    /// Comments whose author profile could not be resolved
    pub anonymous_comments: usize,

    /// API call counters
    pub calls: CallStats,
}

impl HarvestStatistics {
    /// Builds statistics from a harvest report and the client's counters
    pub fn from_report(report: &HarvestReport, calls: CallStats) -> Self {
        Self {
            groups: report.groups,
            posts: report.posts.len(),
            questions: report.questions.len(),
            comments: report.comments.len(),
            anonymous_comments: report
                .comments
                .iter()
                .filter(|c| c.user_name == crate::harvest::normalize::UNKNOWN_AUTHOR)
                .count(),
            calls,
        }
    }

    /// Share of posts kept by the question filter, as a percentage
    pub fn question_rate(&self) -> f64 {
        if self.posts == 0 {
            return 0.0;
        }
        (self.questions as f64 / self.posts as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Groups: {}", stats.groups);
    println!("  Posts collected: {}", stats.posts);
    println!(
        "  Questions: {} ({:.1}%)",
        stats.questions,
        stats.question_rate()
    );
    println!("  Comments: {}", stats.comments);
    println!("  Comments by unknown authors: {}", stats.anonymous_comments);
    println!();

    println!("API:");
    println!("  Requests sent: {}", stats.calls.requests);
    println!("  Rate-limit retries: {}", stats.calls.retries);
    println!("  Failed calls: {}", stats.calls.failures);
}
