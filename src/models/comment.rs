use serde::{Deserialize, Serialize};

use super::de;
use super::user::Creator;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub creator: Creator,
    #[serde(default, deserialize_with = "de::text")]
    pub created: String,
    #[serde(default)]
    pub content: String,
    // Summary of the post the comment belongs to
    #[serde(default, deserialize_with = "de::text")]
    pub post_id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub post_content: String,
    #[serde(default, deserialize_with = "de::text")]
    pub post_creator_profile: String,
    #[serde(default, deserialize_with = "de::text")]
    pub post_creator: String,
    #[serde(default, deserialize_with = "de::text")]
    pub post_created: String,
}

/// Body of comment create and update calls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentContent {
    pub content: String,
}
