use serde::{Deserialize, Serialize};

use super::de;

/// A profile as returned by the accounts endpoints.
/// Only `id` carries meaning for access control; the rest is display data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date_joined: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub cover_pic: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    pub followers: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub following: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_following: bool,
    #[serde(default, deserialize_with = "de::optional_flag")]
    pub is_followed_by_user: Option<bool>,
    #[serde(default, deserialize_with = "de::optional_flag")]
    pub is_following_user: Option<bool>,
}

impl User {
    pub fn has_profile_pic(&self) -> bool {
        self.profile_pic.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_cover_pic(&self) -> bool {
        self.cover_pic.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// The author summary embedded in posts and comments.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Creator {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_pic: Option<String>,
}
