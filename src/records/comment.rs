use std::fmt;

/// Author sex as reported by the profile
///
/// The API encodes this as a small integer; anything it does not recognise,
/// including a missing profile, maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Maps the API's numeric sex code: `2` is male, `1` is female
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(2) => Self::Male,
            Some(1) => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Short form written to CSV (`M`, `F`, or empty)
    pub fn as_csv_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// A comment under a harvested post, enriched with author profile data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Group handle of the parent post
    pub group_id: String,

    /// Identifier of the parent post
    pub post_id: i64,

    /// Comment identifier, unique within the post (absent for malformed items)
    pub comment_id: Option<i64>,

    /// Sanitized comment text
    pub text: String,

    /// Author display name, "Unknown" when the profile could not be resolved
    pub user_name: String,

    /// Normalized timestamp (`DD-MM-YYYY HH:MM:SS`)
    pub date: String,

    /// Name of the author's workplace or school
    pub workplace: Option<String>,

    pub sex: Sex,

    /// Birth date as `DD-MM-YYYY`, only when the profile exposes the full date
    pub bdate: Option<String>,

    pub country: Option<String>,

    pub region: Option<String>,

    /// Number of likes on the comment
    pub likes: u64,
}

impl Comment {
    /// Column names in CSV order
    pub const FIELDS: [&'static str; 12] = [
        "group_id",
        "post_id",
        "comment_id",
        "text",
        "user_name",
        "date",
        "workplace",
        "sex",
        "bdate",
        "country",
        "region",
        "likes",
    ];
}
