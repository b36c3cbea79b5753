//! Harvest module: walls, comments and the run that ties them together
//!
//! This module contains the retrieval logic, including:
//! - Wall paging with a count cap or a date boundary
//! - Group handle resolution
//! - Comment enrichment with author profiles and like counts
//! - Display-field normalization
//! - The harvest run: posts, question filter, comments

mod comments;
mod groups;
mod likes;
pub mod normalize;
mod posts;

pub use comments::{build_comment, fetch_comments, COMMENT_PAGE_SIZE, PROFILE_FIELDS};
pub use groups::{resolve_group_id, GroupResolver};
pub use likes::{comment_likes, LikeLookup, MAX_EXECUTE_CALLS};
pub use normalize::DateNormalizer;
pub use posts::{collect_posts, PAGE_SIZE};

use crate::api::ApiClient;
use crate::predictor::QuestionPredictor;
use crate::records::{Comment, Post};
use chrono::NaiveDate;
use std::time::Duration;

/// When the wall pager stops
///
/// The two modes are mutually exclusive: a date boundary lifts the count cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostLimit {
    /// Collect at most this many posts
    Count(usize),

    /// Collect every post published on or after this day
    Since(NaiveDate),
}

impl Default for PostLimit {
    fn default() -> Self {
        Self::Count(100)
    }
}

/// Knobs for one harvest run
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSettings {
    pub limit: PostLimit,

    /// Comments requested per post
    pub max_comments: usize,

    /// Pause between consecutive wall pages
    pub page_delay: Duration,

    pub likes: LikeLookup,

    pub dates: DateNormalizer,

    /// Pass over old pinned posts instead of ending a cutoff walk
    pub skip_old_pinned: bool,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            limit: PostLimit::default(),
            max_comments: COMMENT_PAGE_SIZE,
            page_delay: Duration::from_millis(100),
            likes: LikeLookup::default(),
            dates: DateNormalizer::default(),
            skip_old_pinned: false,
        }
    }
}

/// Everything a harvest run produced
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// Number of groups walked
    pub groups: usize,

    /// All collected posts, in group order then wall order
    pub posts: Vec<Post>,

    /// Posts the predictor kept
    pub questions: Vec<Post>,

    /// Comments under the kept posts
    pub comments: Vec<Comment>,
}

impl HarvestReport {
    /// Returns true if every comment belongs to one of the kept posts
    pub fn is_consistent(&self) -> bool {
        self.comments
            .iter()
            .all(|c| self.questions.iter().any(|p| p.owns(c)))
    }
}

/// Drives a harvest run over one API client
pub struct Harvester {
    client: ApiClient,
    settings: HarvestSettings,
    groups: GroupResolver,
}

impl Harvester {
    pub fn new(client: ApiClient, settings: HarvestSettings) -> Self {
        Self {
            client,
            settings,
            groups: GroupResolver::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    /// Collects the posts of one group using the configured limit
    pub async fn collect_posts(&self, group: &str) -> Vec<Post> {
        collect_posts(&self.client, group, self.settings.limit, &self.settings).await
    }

    /// Resolves a group handle, reusing earlier resolutions
    pub async fn resolve_group(&mut self, group: &str) -> Option<i64> {
        self.groups.resolve(&self.client, group).await
    }

    /// Collects the first page of comments under a post
    ///
    /// Returns an empty list if the group handle does not resolve.
    pub async fn collect_comments(&mut self, group: &str, post_id: i64, max_count: usize) -> Vec<Comment> {
        let Some(group_id) = self.resolve_group(group).await else {
            tracing::warn!(group, post_id, "Skipping comments: group id unresolved");
            return Vec::new();
        };

        fetch_comments(&self.client, group, group_id, post_id, max_count, &self.settings).await
    }

    /// Runs a full harvest
    ///
    /// 1. Collect posts of every group, in order
    /// 2. Keep the posts the predictor accepts
    /// 3. Collect comments under each kept post
    ///
    /// Nothing here fails: every failed call shrinks the result instead.
    pub async fn run<P>(&mut self, groups: &[String], predictor: &P) -> HarvestReport
    where
        P: QuestionPredictor + ?Sized,
    {
        let start_time = std::time::Instant::now();
        let mut report = HarvestReport {
            groups: groups.len(),
            ..HarvestReport::default()
        };

        for group in groups {
            let posts = self.collect_posts(group).await;
            report.posts.extend(posts);
        }
        tracing::info!(
            groups = groups.len(),
            posts = report.posts.len(),
            "Wall collection finished"
        );

        report.questions = report
            .posts
            .iter()
            .filter(|post| predictor.is_question(&post.text))
            .cloned()
            .collect();
        tracing::info!(
            questions = report.questions.len(),
            posts = report.posts.len(),
            "Question filter applied"
        );

        let max_comments = self.settings.max_comments;
        for (index, post) in report.questions.iter().enumerate() {
            let comments = self
                .collect_comments(&post.group_id, post.post_id, max_comments)
                .await;
            report.comments.extend(comments);

            let done = index + 1;
            if done % 10 == 0 {
                tracing::info!(
                    "Progress: comments for {}/{} posts, {} comments so far",
                    done,
                    report.questions.len(),
                    report.comments.len()
                );
            }
        }

        tracing::info!(
            comments = report.comments.len(),
            "Harvest completed in {:?}",
            start_time.elapsed()
        );
        report
    }
}
