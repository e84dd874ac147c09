use crate::gateway::{ApiClient, ApiError, ApiRequest};
use crate::models::{Comment, CommentContent, Page};

#[derive(Clone)]
pub struct CommentService {
    api: ApiClient,
}

impl CommentService {
    pub fn new(api: ApiClient) -> Self {
        CommentService { api }
    }

    pub async fn post_comments(&self, post_id: u64, page: u32) -> Result<Page<Comment>, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/post/{post_id}/comments/")).page(page))
            .await
    }

    /// Every comment, across posts.
    pub async fn all_comments(&self, page: u32) -> Result<Page<Comment>, ApiError> {
        self.api
            .json(ApiRequest::get("/post/comments/all/").page(page))
            .await
    }

    pub async fn comment(&self, comment_id: u64) -> Result<Comment, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/post/comments/{comment_id}/")))
            .await
    }

    pub async fn create_comment(&self, post_id: u64, content: &str) -> Result<Comment, ApiError> {
        let body = Self::content(content)?;
        let request = ApiRequest::post(format!("/post/{post_id}/comments/create/")).json(&body)?;
        self.api.json(request).await
    }

    pub async fn update_comment(&self, comment_id: u64, content: &str) -> Result<Comment, ApiError> {
        let body = Self::content(content)?;
        let request =
            ApiRequest::patch(format!("/post/comments/update/{comment_id}/")).json(&body)?;
        self.api.json(request).await
    }

    pub async fn delete_comment(&self, comment_id: u64) -> Result<(), ApiError> {
        self.api
            .execute(ApiRequest::delete(format!(
                "/post/comments/delete/{comment_id}/"
            )))
            .await
    }

    fn content(content: &str) -> Result<CommentContent, ApiError> {
        if content.trim().is_empty() {
            return Err(ApiError::invalid_field("content", "Comment cannot be empty."));
        }
        Ok(CommentContent {
            content: content.to_string(),
        })
    }
}
