/// A single wall post harvested from a group
///
/// Posts are created once per fetched wall item and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Group handle the wall belongs to (as configured, e.g. "apiclub")
    pub group_id: String,

    /// Post identifier, unique within the group's wall
    pub post_id: i64,

    /// Sanitized post text
    pub text: String,

    /// Normalized publication timestamp (`DD-MM-YYYY HH:MM:SS`)
    pub date: String,

    /// Number of likes at harvest time
    pub likes: u64,
}

impl Post {
    /// Column names in CSV order
    pub const FIELDS: [&'static str; 5] = ["group_id", "post_id", "text", "date", "likes"];

    /// Returns true if this post is the parent of the given comment
    pub fn owns(&self, comment: &crate::records::Comment) -> bool {
        self.group_id == comment.group_id && self.post_id == comment.post_id
    }
}
