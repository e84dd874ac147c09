use tracing::debug;

use crate::gateway::{ApiClient, ApiError, ApiRequest};
use crate::models::{Page, Post};

use super::forms::PostDraft;

#[derive(Clone)]
pub struct PostService {
    api: ApiClient,
}

impl PostService {
    pub fn new(api: ApiClient) -> Self {
        PostService { api }
    }

    /// The global feed, newest first.
    pub async fn all_posts(&self, page: u32) -> Result<Page<Post>, ApiError> {
        self.api
            .json(ApiRequest::get("/post/all/").page(page))
            .await
    }

    pub async fn user_posts(&self, user_id: u64, page: u32) -> Result<Page<Post>, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/post/user/{user_id}/all/")).page(page))
            .await
    }

    pub async fn post(&self, post_id: u64) -> Result<Post, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/post/{post_id}/")))
            .await
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ApiError> {
        draft.validate()?;
        let request = Self::with_draft(ApiRequest::post("/post/create/"), draft, false)?;
        self.api.json(request).await
    }

    /// Save an edit; the server marks the post as edited.
    pub async fn update_post(&self, post_id: u64, draft: &PostDraft) -> Result<Post, ApiError> {
        draft.validate()?;
        let request = Self::with_draft(
            ApiRequest::patch(format!("/post/update/{post_id}/")),
            draft,
            true,
        )?;
        self.api.json(request).await
    }

    pub async fn delete_post(&self, post_id: u64) -> Result<(), ApiError> {
        self.api
            .execute(ApiRequest::delete(format!("/post/delete/{post_id}/")))
            .await
    }

    /// Toggle the like on a post.
    pub async fn like_post(&self, post_id: u64) -> Result<(), ApiError> {
        self.api
            .execute(ApiRequest::post(format!("/post/{post_id}/like/")))
            .await
    }

    /// Toggle the bookmark on a post.
    pub async fn save_post(&self, post_id: u64) -> Result<(), ApiError> {
        self.api
            .execute(ApiRequest::post(format!("/post/{post_id}/save/")))
            .await
    }

    fn with_draft(
        request: ApiRequest,
        draft: &PostDraft,
        edited: bool,
    ) -> Result<ApiRequest, ApiError> {
        if draft.needs_multipart() {
            debug!("Sending post draft as multipart");
            Ok(request.multipart(draft.to_form(edited)))
        } else {
            request.json(&draft.to_json(edited))
        }
    }
}
