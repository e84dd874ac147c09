use serde::{Deserialize, Serialize};

use super::de;
use super::user::Creator;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    pub creator: Creator,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Display text, passed through as the server renders it.
    #[serde(default, deserialize_with = "de::text")]
    pub created: String,
    #[serde(default, deserialize_with = "de::count")]
    pub likes: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_liked: bool,
    #[serde(default, deserialize_with = "de::count")]
    pub comments: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub saves: u64,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_saved: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_commented: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_following_user: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_followed_by_user: bool,
    #[serde(rename = "isEdited", default)]
    pub is_edited: bool,
}

impl Post {
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_from_server_payload() {
        let body = r#"{
            "id": 42,
            "creator": {"id": 7, "username": "alice", "email": "a@example.com", "profile_pic": null},
            "likes": "5",
            "is_liked": true,
            "image": null,
            "content": "hello",
            "created": "2024-03-01T09:30:00Z",
            "comments": "2",
            "saves": "0",
            "is_saved": false,
            "is_commented": "false",
            "is_following_user": "true",
            "is_followed_by_user": "false",
            "isEdited": true
        }"#;
        let post: Post = serde_json::from_str(body).expect("post should parse");
        assert_eq!(post.id, 42);
        assert_eq!(post.creator.username, "alice");
        assert_eq!(post.likes, 5);
        assert_eq!(post.comments, 2);
        assert!(post.is_liked);
        assert!(post.is_following_user);
        assert!(post.is_edited);
        assert!(!post.has_image());
        assert_eq!(post.created, "2024-03-01T09:30:00Z");
    }

    #[test]
    fn test_post_keeps_display_timestamp() {
        let body = r#"{
            "id": 43,
            "creator": {"id": 7, "username": "alice"},
            "content": "hi",
            "created": "01 Mar 2024, 09:30"
        }"#;
        let post: Post = serde_json::from_str(body).expect("post should parse");
        assert_eq!(post.created, "01 Mar 2024, 09:30");
    }
}
