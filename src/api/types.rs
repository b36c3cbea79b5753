//! Payload types for the API methods the harvester uses
//!
//! Only the fields the harvester reads are modelled. Nested profile
//! sub-objects are kept as raw JSON because the API returns them in more than
//! one shape; the accessors on [`Profile`] never fail.
//!
//! Arrays of entries are decoded one element at a time: a malformed entry is
//! dropped on its own and the rest of the page survives.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes each element on its own, dropping the ones that do not fit `T`
pub fn decode_entries<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Dropping malformed entry: {}", e);
                None
            }
        })
        .collect()
}

/// Serde adapter for [`decode_entries`]; `null` reads as an empty list
fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_entries(values))
}

/// `{"count": n}` sub-object attached to posts and comments
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LikesInfo {
    #[serde(default)]
    pub count: u64,
}

/// Payload of `wall.get`
///
/// Items stay raw so the pager can tell a short page from a page with
/// malformed entries; see [`WallPage::wall_items`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WallPage {
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub items: Vec<Value>,
}

impl WallPage {
    /// Decodes the items, dropping malformed ones
    pub fn wall_items(self) -> Vec<WallItem> {
        decode_entries(self.items)
    }
}

/// One wall item
#[derive(Debug, Clone, Deserialize)]
pub struct WallItem {
    pub id: i64,

    #[serde(default)]
    pub text: String,

    /// Unix timestamp, zero when absent
    #[serde(default)]
    pub date: i64,

    #[serde(default)]
    pub likes: Option<LikesInfo>,

    #[serde(default)]
    pub is_pinned: i64,
}

impl WallItem {
    pub fn like_count(&self) -> u64 {
        self.likes.map(|l| l.count).unwrap_or(0)
    }

    pub fn pinned(&self) -> bool {
        self.is_pinned == 1
    }
}

/// Payload of an extended `wall.getComments` call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentsPage {
    #[serde(default)]
    pub count: u64,

    #[serde(default, deserialize_with = "entries")]
    pub items: Vec<CommentItem>,

    #[serde(default, deserialize_with = "entries")]
    pub profiles: Vec<Profile>,
}

/// One comment item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentItem {
    #[serde(default)]
    pub id: Option<i64>,

    /// Author id; negative for comments posted on behalf of a community
    #[serde(default)]
    pub from_id: Option<i64>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub date: i64,

    /// Only present when the call asked for `need_likes=1`
    #[serde(default)]
    pub likes: Option<LikesInfo>,
}

/// Author profile returned alongside comments
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub id: i64,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub sex: Option<i64>,

    /// Raw `D.M` or `D.M.YYYY` birth date
    #[serde(default)]
    pub bdate: Option<String>,

    #[serde(default)]
    pub occupation: Option<Value>,

    #[serde(default)]
    pub city: Option<Value>,

    #[serde(default)]
    pub country: Option<Value>,
}

impl Profile {
    /// Occupation name, only when occupation is an object with a string name
    pub fn workplace(&self) -> Option<&str> {
        object_str(self.occupation.as_ref(), "name")
    }

    /// City title
    pub fn city_title(&self) -> Option<&str> {
        object_str(self.city.as_ref(), "title")
    }

    /// Country title
    pub fn country_title(&self) -> Option<&str> {
        object_str(self.country.as_ref(), "title")
    }
}

fn object_str<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value
        .and_then(Value::as_object)
        .and_then(|obj| obj.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Payload of `groups.getById`
///
/// Older protocol versions return a bare array; newer ones wrap it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GroupsPayload {
    List(Vec<GroupInfo>),
    Wrapped { groups: Vec<GroupInfo> },
}

impl GroupsPayload {
    /// Numeric id of the first group in the payload
    pub fn first_id(&self) -> Option<i64> {
        let groups = match self {
            Self::List(groups) => groups,
            Self::Wrapped { groups } => groups,
        };
        groups.first().and_then(|g| g.id).filter(|id| *id > 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Payload of `likes.getList`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LikesList {
    #[serde(default)]
    pub count: u64,
}
