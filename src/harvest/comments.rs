//! Comment enrichment
//!
//! One extended `wall.getComments` call returns a page of comments together
//! with the profiles of their authors. Comments are joined with those profiles
//! and with like counts from [`LikeLookup`](crate::harvest::LikeLookup).
//!
//! Only the first page of comments is fetched. A post with more comments than
//! the requested count yields just that first page.

use crate::api::types::{CommentItem, CommentsPage, Profile};
use crate::api::ApiClient;
use crate::harvest::normalize::{
    display_name, normalize_bdate, sanitize_text, DateNormalizer, UNKNOWN_AUTHOR,
};
use crate::harvest::HarvestSettings;
use crate::records::{Comment, Sex};
use std::collections::HashMap;

/// Maximum number of comments requested for one post
pub const COMMENT_PAGE_SIZE: usize = 100;

/// Profile fields requested with the comment listing
pub const PROFILE_FIELDS: &str = "occupation,sex,bdate,city,country";

/// Fetches and enriches the first page of comments under a post
///
/// # Arguments
///
/// * `client` - The API client
/// * `group` - Group handle, copied into every comment
/// * `group_id` - Numeric (positive) id of the group
/// * `post_id` - The parent post
/// * `max_count` - Number of comments wanted, capped at [`COMMENT_PAGE_SIZE`]
/// * `settings` - Like lookup strategy and date formatting
pub async fn fetch_comments(
    client: &ApiClient,
    group: &str,
    group_id: i64,
    post_id: i64,
    max_count: usize,
    settings: &HarvestSettings,
) -> Vec<Comment> {
    if max_count == 0 {
        return Vec::new();
    }

    let owner_id = -group_id;
    let mut params = vec![
        ("owner_id", owner_id.to_string()),
        ("post_id", post_id.to_string()),
        ("extended", "1".to_string()),
        ("fields", PROFILE_FIELDS.to_string()),
        ("count", COMMENT_PAGE_SIZE.min(max_count).to_string()),
    ];
    if settings.likes.needs_inline_likes() {
        params.push(("need_likes", "1".to_string()));
    }

    let page: CommentsPage = match client.call("wall.getComments", &params).await {
        Ok(page) => page,
        Err(_) => return Vec::new(),
    };

    if page.items.is_empty() {
        return Vec::new();
    }

    let profiles: HashMap<i64, &Profile> = page.profiles.iter().map(|p| (p.id, p)).collect();
    let likes = settings.likes.like_counts(client, owner_id, &page.items).await;

    let comments: Vec<Comment> = page
        .items
        .iter()
        .map(|item| {
            let author = item.from_id.and_then(|id| profiles.get(&id).copied());
            let like_count = item.id.and_then(|id| likes.get(&id).copied()).unwrap_or(0);
            build_comment(group, post_id, item, author, like_count, &settings.dates)
        })
        .collect();

    tracing::debug!(
        group,
        post_id,
        comments = comments.len(),
        total = page.count,
        "Collected comments"
    );
    comments
}

/// Joins a comment item with its (possibly missing) author profile
pub fn build_comment(
    group: &str,
    post_id: i64,
    item: &CommentItem,
    author: Option<&Profile>,
    likes: u64,
    dates: &DateNormalizer,
) -> Comment {
    let user_name = match author {
        Some(profile) => display_name(profile.first_name.as_deref(), profile.last_name.as_deref()),
        None => UNKNOWN_AUTHOR.to_string(),
    };

    Comment {
        group_id: group.to_string(),
        post_id,
        comment_id: item.id,
        text: sanitize_text(&item.text),
        user_name,
        date: dates.format_timestamp(item.date),
        workplace: author.and_then(Profile::workplace).map(str::to_string),
        sex: Sex::from_code(author.and_then(|p| p.sex)),
        bdate: author
            .and_then(|p| p.bdate.as_deref())
            .and_then(normalize_bdate),
        country: author.and_then(Profile::country_title).map(str::to_string),
        region: author.and_then(Profile::city_title).map(str::to_string),
        likes,
    }
}
