//! Wall pager
//!
//! Walks a group's wall newest-first in pages of up to [`PAGE_SIZE`] items.
//!
//! # Termination
//!
//! | Mode | Stops when |
//! |------|------------|
//! | `Count(n)` | `n` posts collected, or a short page (end of wall) |
//! | `Since(date)` | first post older than `date`, or a short page |
//! | both | an empty page or a failed call |
//!
//! With `skip_old_pinned` set, an old pinned post is passed over instead of
//! ending a `Since` walk.

use crate::api::types::{WallItem, WallPage};
use crate::api::ApiClient;
use crate::harvest::normalize::{sanitize_text, DateNormalizer};
use crate::harvest::{HarvestSettings, PostLimit};
use crate::records::Post;

/// Maximum number of items the API returns per page
pub const PAGE_SIZE: usize = 100;

/// Collects the posts of one group's wall
///
/// Only posts authored by the group itself are requested. Failures end the
/// walk early and return whatever was collected so far.
///
/// # Arguments
///
/// * `client` - The API client
/// * `group` - Group handle, e.g. `apiclub`
/// * `limit` - Count cap or date boundary
/// * `settings` - Pacing delay and date formatting
pub async fn collect_posts(
    client: &ApiClient,
    group: &str,
    limit: PostLimit,
    settings: &HarvestSettings,
) -> Vec<Post> {
    let max_posts = match limit {
        PostLimit::Count(max) => Some(max),
        PostLimit::Since(_) => None,
    };
    let cutoff = match limit {
        PostLimit::Count(_) => None,
        PostLimit::Since(date) => Some(settings.dates.start_of_day(date)),
    };

    let mut posts: Vec<Post> = Vec::new();
    let mut offset = 0usize;

    loop {
        let requested = match max_posts {
            Some(max) if posts.len() >= max => break,
            Some(max) => PAGE_SIZE.min(max - posts.len()),
            None => PAGE_SIZE,
        };

        let page: WallPage = match client
            .call(
                "wall.get",
                &[
                    ("domain", group.to_string()),
                    ("count", requested.to_string()),
                    ("offset", offset.to_string()),
                    ("filter", "owner".to_string()),
                ],
            )
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(group, offset, "Stopping wall walk: {}", e);
                break;
            }
        };

        if page.items.is_empty() {
            break;
        }

        // Raw length: a dropped malformed item must not end the walk
        let received = page.items.len();
        let mut reached_cutoff = false;

        for item in page.wall_items() {
            if let Some(cutoff) = cutoff {
                if item.date > 0 && item.date < cutoff {
                    if settings.skip_old_pinned && item.pinned() {
                        tracing::debug!(group, post_id = item.id, "Skipping old pinned post");
                        continue;
                    }
                    reached_cutoff = true;
                    break;
                }
            }
            posts.push(to_post(group, item, &settings.dates));
        }

        tracing::debug!(
            group,
            offset,
            received,
            collected = posts.len(),
            "Fetched wall page"
        );

        if reached_cutoff || received < requested {
            break;
        }

        offset += requested;
        tokio::time::sleep(settings.page_delay).await;
    }

    if let Some(max) = max_posts {
        posts.truncate(max);
    }

    tracing::info!(group, posts = posts.len(), "Collected posts");
    posts
}

/// Converts a wall item into a post record
fn to_post(group: &str, item: WallItem, dates: &DateNormalizer) -> Post {
    Post {
        group_id: group.to_string(),
        post_id: item.id,
        likes: item.like_count(),
        text: sanitize_text(&item.text),
        date: dates.format_timestamp(item.date),
    }
}
