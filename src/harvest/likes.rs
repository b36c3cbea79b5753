//! Comment like-count lookup
//!
//! The comment listing does not carry like counts unless asked to, so every
//! comment costs an extra `likes.getList` round trip in the plain strategy.
//! The batched strategy packs up to [`MAX_EXECUTE_CALLS`] of those lookups into
//! one `execute` call and falls back to single lookups when that call fails.

use crate::api::types::{CommentItem, LikesList};
use crate::api::ApiClient;
use serde_json::Value;
use std::collections::HashMap;

/// Upper bound on API calls inside one `execute` script
pub const MAX_EXECUTE_CALLS: usize = 25;

/// How like counts are obtained for a page of comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikeLookup {
    /// One `likes.getList` call per comment
    #[default]
    PerItem,

    /// `likes.getList` calls grouped into `execute` calls
    Batched { batch_size: usize },

    /// Counts read from the comment listing itself (`need_likes=1`)
    Inline,
}

impl LikeLookup {
    /// Batched lookup with the largest batch the API accepts
    pub fn batched() -> Self {
        Self::Batched {
            batch_size: MAX_EXECUTE_CALLS,
        }
    }

    /// Returns true if the comment listing must ask for inline like counts
    pub fn needs_inline_likes(&self) -> bool {
        matches!(self, Self::Inline)
    }

    /// Resolves like counts for a page of comments, keyed by comment id
    ///
    /// Comments without an id are skipped; ids missing from the returned map
    /// have zero likes.
    ///
    /// # Arguments
    ///
    /// * `client` - The API client
    /// * `owner_id` - Negative numeric id of the wall that owns the comments
    /// * `items` - The comment page
    pub async fn like_counts(
        &self,
        client: &ApiClient,
        owner_id: i64,
        items: &[CommentItem],
    ) -> HashMap<i64, u64> {
        match self {
            Self::Inline => items
                .iter()
                .filter_map(|item| Some((item.id?, item.likes.map(|l| l.count).unwrap_or(0))))
                .collect(),
            Self::PerItem => {
                let mut counts = HashMap::new();
                for id in items.iter().filter_map(|item| item.id) {
                    counts.insert(id, comment_likes(client, owner_id, id).await);
                }
                counts
            }
            Self::Batched { batch_size } => {
                let ids: Vec<i64> = items.iter().filter_map(|item| item.id).collect();
                batched_likes(client, owner_id, &ids, *batch_size).await
            }
        }
    }
}

/// Fetches the like count of a single comment, zero on failure
pub async fn comment_likes(client: &ApiClient, owner_id: i64, comment_id: i64) -> u64 {
    client
        .call::<LikesList>(
            "likes.getList",
            &[
                ("type", "comment".to_string()),
                ("owner_id", owner_id.to_string()),
                ("item_id", comment_id.to_string()),
            ],
        )
        .await
        .map(|list| list.count)
        .unwrap_or(0)
}

async fn batched_likes(
    client: &ApiClient,
    owner_id: i64,
    ids: &[i64],
    batch_size: usize,
) -> HashMap<i64, u64> {
    let batch_size = batch_size.clamp(1, MAX_EXECUTE_CALLS);
    let mut counts = HashMap::with_capacity(ids.len());

    for chunk in ids.chunks(batch_size) {
        let script = likes_script(owner_id, chunk);
        match client
            .call::<Vec<Value>>("execute", &[("code", script)])
            .await
        {
            Ok(results) => {
                for (id, result) in chunk.iter().zip(results.iter()) {
                    let count = result.get("count").and_then(Value::as_u64).unwrap_or(0);
                    counts.insert(*id, count);
                }
            }
            Err(_) => {
                tracing::debug!(owner_id, batch = chunk.len(), "Falling back to single like lookups");
                for id in chunk {
                    counts.insert(*id, comment_likes(client, owner_id, *id).await);
                }
            }
        }
    }

    counts
}

/// Builds an `execute` script returning one `likes.getList` result per id
fn likes_script(owner_id: i64, ids: &[i64]) -> String {
    let calls: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"API.likes.getList({{"type":"comment","owner_id":{},"item_id":{}}})"#,
                owner_id, id
            )
        })
        .collect();
    format!("return [{}];", calls.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::LikesInfo;
    use crate::api::RetryPolicy;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/method/", server.uri()), "t", "5.131", RetryPolicy::default())
            .unwrap()
    }

    fn comment(id: Option<i64>, likes: Option<u64>) -> CommentItem {
        CommentItem {
            id,
            from_id: Some(1),
            likes: likes.map(|count| LikesInfo { count }),
            ..CommentItem::default()
        }
    }

    #[test]
    fn test_likes_script() {
        assert_eq!(
            likes_script(-1, &[5, 6]),
            r#"return [API.likes.getList({"type":"comment","owner_id":-1,"item_id":5}),API.likes.getList({"type":"comment","owner_id":-1,"item_id":6})];"#
        );
    }

    #[tokio::test]
    async fn test_inline_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = vec![comment(Some(1), Some(4)), comment(Some(2), None), comment(None, Some(9))];
        let counts = LikeLookup::Inline.like_counts(&client, -1, &items).await;

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&1], 4);
        assert_eq!(counts[&2], 0);
    }

    #[tokio::test]
    async fn test_per_item_skips_comments_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/method/likes.getList"))
            .and(query_param("type", "comment"))
            .and(query_param("owner_id", "-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": {"count": 3, "items": [1, 2, 3]}})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = vec![comment(Some(10), None), comment(None, None), comment(Some(11), None)];
        let counts = LikeLookup::PerItem.like_counts(&client, -1, &items).await;

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&10], 3);
        assert_eq!(counts[&11], 3);
    }

    #[tokio::test]
    async fn test_per_item_failure_counts_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"error_code": 15, "error_msg": "Access denied"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(comment_likes(&client, -1, 5).await, 0);
    }

    #[tokio::test]
    async fn test_batched_uses_one_execute_per_chunk() {
        let server = MockServer::start().await;
        let results: Vec<_> = (0..25).map(|i| serde_json::json!({"count": i, "items": []})).collect();
        Mock::given(method("GET"))
            .and(path("/method/execute"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": results})),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/method/likes.getList"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items: Vec<_> = (100..130).map(|id| comment(Some(id), None)).collect();
        let counts = LikeLookup::batched().like_counts(&client, -1, &items).await;

        assert_eq!(counts.len(), 30);
        assert_eq!(counts[&100], 0);
        assert_eq!(counts[&103], 3);
        // second chunk starts over at the first result
        assert_eq!(counts[&126], 1);
    }

    #[tokio::test]
    async fn test_batched_false_entries_count_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/method/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [{"count": 2, "items": []}, false],
                "execute_errors": [{"method": "likes.getList", "error_code": 15}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = vec![comment(Some(1), None), comment(Some(2), None)];
        let counts = LikeLookup::batched().like_counts(&client, -1, &items).await;

        assert_eq!(counts[&1], 2);
        assert_eq!(counts[&2], 0);
    }

    #[tokio::test]
    async fn test_batched_falls_back_to_single_lookups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/method/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"error_code": 13, "error_msg": "Runtime error"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/method/likes.getList"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": {"count": 7}})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = vec![comment(Some(1), None), comment(Some(2), None)];
        let counts = LikeLookup::batched().like_counts(&client, -1, &items).await;

        assert_eq!(counts[&1], 7);
        assert_eq!(counts[&2], 7);
    }
}
