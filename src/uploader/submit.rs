use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;
use crate::storage::CredentialStore;

use super::api_client::{extract_post_id, ApiClient};
use super::payload::PostPayload;

/// Site routes a submission can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    OwnProfile,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/users/home/",
            Route::OwnProfile => "/users/me/",
        }
    }
}

/// Terminal result of one submission. A rejected or failed upload leaves the
/// user where they are; the diagnostic goes to the log, not the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Redirect(Route),
    Stay,
}

/// One form submission: the selected images, in order, and the caption text.
/// Built fresh per submission and discarded with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSubmission {
    pub image_paths: Vec<String>,
    pub caption: String,
}

/// Handles a post submission end to end: credential check, payload
/// assembly, the single POST, and the resulting navigation.
pub struct PostSubmissionHandler {
    client: ApiClient,
    store: CredentialStore,
}

impl PostSubmissionHandler {
    pub fn new(client: ApiClient, store: CredentialStore) -> Self {
        Self { client, store }
    }

    /// Submissions are independent of each other; nothing here debounces or
    /// serializes concurrent calls.
    pub async fn handle(&self, submission: PostSubmission) -> AppResult<SubmitOutcome> {
        // Correlates the log lines of this submission
        let submission_id = Uuid::new_v4().to_string();

        let access_token = match self.store.access_token().await? {
            Some(token) => token,
            None => {
                log::info!(
                    "No access token stored, redirecting to {} (submission {})",
                    Route::Home.path(),
                    submission_id
                );
                return Ok(SubmitOutcome::Redirect(Route::Home));
            }
        };

        for file_path in &submission.image_paths {
            InputValidator::validate_image_path(file_path)?;
        }

        let mut payload = PostPayload::new();
        if submission.image_paths.is_empty() {
            payload.add_blank_image_field();
        } else {
            for file_path in &submission.image_paths {
                payload.add_image(file_path).await?;
            }
        }
        payload.add_caption(&submission.caption);

        log::info!(
            "Submitting post with {} images (submission {})",
            payload.image_count(),
            submission_id
        );

        let response = match self.client.create_post(&access_token, &payload).await {
            Ok(response) => response,
            Err(AppError::Network(e)) => {
                log::error!("Post request failed for submission {}: {}", submission_id, e);
                return Ok(SubmitOutcome::Stay);
            }
            Err(e) => return Err(e),
        };

        let status = response.status();

        if status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            match extract_post_id(&response_text) {
                Some(post_id) => log::info!(
                    "Post {} created, redirecting to {} (submission {})",
                    post_id,
                    Route::OwnProfile.path(),
                    submission_id
                ),
                None => log::info!(
                    "Post created, redirecting to {} (submission {})",
                    Route::OwnProfile.path(),
                    submission_id
                ),
            }
            return Ok(SubmitOutcome::Redirect(Route::OwnProfile));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::warn!(
            "Post rejected with status {} (submission {}): {}",
            status,
            submission_id,
            &error_text[..std::cmp::min(300, error_text.len())]
        );

        Ok(SubmitOutcome::Stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/users/home/");
        assert_eq!(Route::OwnProfile.path(), "/users/me/");
    }
}
