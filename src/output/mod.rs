//! Output module for harvest results
//!
//! This module handles:
//! - Writing posts and comments as CSV files
//! - Summarizing a run for the terminal

mod csv;
pub mod stats;

pub use csv::{
    escape_field, format_comments_csv, format_posts_csv, write_comments_csv, write_posts_csv,
};
pub use stats::{print_statistics, HarvestStatistics};

use crate::harvest::HarvestReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Paths of the files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub posts: PathBuf,
    pub comments: PathBuf,
}

/// Writes a harvest report to the output directory
///
/// # Arguments
///
/// * `report` - The harvest report
/// * `directory` - Output directory (created if missing)
/// * `posts_file` - File name for posts
/// * `comments_file` - File name for comments
/// * `all_posts` - Write every collected post instead of only the kept ones
pub fn write_report(
    report: &HarvestReport,
    directory: &Path,
    posts_file: &str,
    comments_file: &str,
    all_posts: bool,
) -> OutputResult<WrittenFiles> {
    if posts_file == comments_file {
        return Err(OutputError::Write(format!(
            "posts and comments would both be written to '{}'",
            posts_file
        )));
    }

    let files = WrittenFiles {
        posts: directory.join(posts_file),
        comments: directory.join(comments_file),
    };

    let posts = if all_posts {
        &report.posts
    } else {
        &report.questions
    };

    write_posts_csv(posts, &files.posts)?;
    write_comments_csv(&report.comments, &files.comments)?;

    Ok(files)
}
