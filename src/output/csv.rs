//! CSV export of harvested records
//!
//! Both files start with a header row naming the record fields in order.
//! Absent optional values are written as empty cells.

use crate::output::OutputResult;
use crate::records::{Comment, Post};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes posts to a CSV file, creating parent directories as needed
///
/// # Arguments
///
/// * `posts` - The posts to write
/// * `output_path` - Destination file
pub fn write_posts_csv(posts: &[Post], output_path: &Path) -> OutputResult<()> {
    write_file(output_path, &format_posts_csv(posts))?;
    tracing::info!("Wrote {} posts to {}", posts.len(), output_path.display());
    Ok(())
}

/// Writes comments to a CSV file, creating parent directories as needed
///
/// # Arguments
///
/// * `comments` - The comments to write
/// * `output_path` - Destination file
pub fn write_comments_csv(comments: &[Comment], output_path: &Path) -> OutputResult<()> {
    write_file(output_path, &format_comments_csv(comments))?;
    tracing::info!(
        "Wrote {} comments to {}",
        comments.len(),
        output_path.display()
    );
    Ok(())
}

/// Formats posts as CSV text
pub fn format_posts_csv(posts: &[Post]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, Post::FIELDS.iter().map(|f| f.to_string()));

    for post in posts {
        push_row(
            &mut csv,
            [
                post.group_id.clone(),
                post.post_id.to_string(),
                post.text.clone(),
                post.date.clone(),
                post.likes.to_string(),
            ],
        );
    }

    csv
}

/// Formats comments as CSV text
pub fn format_comments_csv(comments: &[Comment]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, Comment::FIELDS.iter().map(|f| f.to_string()));

    for comment in comments {
        push_row(
            &mut csv,
            [
                comment.group_id.clone(),
                comment.post_id.to_string(),
                comment.comment_id.map(|id| id.to_string()).unwrap_or_default(),
                comment.text.clone(),
                comment.user_name.clone(),
                comment.date.clone(),
                comment.workplace.clone().unwrap_or_default(),
                comment.sex.as_csv_str().to_string(),
                comment.bdate.clone().unwrap_or_default(),
                comment.country.clone().unwrap_or_default(),
                comment.region.clone().unwrap_or_default(),
                comment.likes.to_string(),
            ],
        );
    }

    csv
}

/// Quotes a field if it contains a separator, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row<I>(csv: &mut String, fields: I)
where
    I: IntoIterator<Item = String>,
{
    let row: Vec<String> = fields.into_iter().map(|f| escape_field(&f)).collect();
    csv.push_str(&row.join(","));
    csv.push('\n');
}

fn write_file(output_path: &Path, content: &str) -> OutputResult<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}
