use reqwest::{Client, Response};
use std::time::Duration;

use crate::errors::AppResult;

use super::payload::PostPayload;

/// API path the service accepts new posts on.
pub const POSTS_PATH: &str = "/apps.post/api/posts/";

/// HTTP client for the photo service API
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn posts_url(&self) -> String {
        format!("{}{}", self.base_url, POSTS_PATH)
    }

    /// Issue the one POST of a submission. Transport failures surface as
    /// `AppError::Network`; HTTP-level rejection is left in the response for
    /// the caller to branch on.
    pub async fn create_post(
        &self,
        access_token: &str,
        payload: &PostPayload,
    ) -> AppResult<Response> {
        let form = payload.build_form()?;
        let url = self.posts_url();

        log::debug!("POST {} ({} image parts)", url, payload.image_count());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .multipart(form)
            .send()
            .await?;

        Ok(response)
    }
}

/// Pull the created post id out of the API response body, if there is one.
/// Only used for logging; an unparseable body is not an error.
pub fn extract_post_id(response_data: &str) -> Option<String> {
    if response_data.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(response_data) {
        Ok(json) => match json.get("id") {
            Some(serde_json::Value::String(id)) => Some(id.clone()),
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => None,
        },
        Err(e) => {
            log::debug!("Failed to parse post response as JSON: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_url_joins_base_and_path() {
        let client = ApiClient::new("http://localhost:8000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.posts_url(),
            "http://localhost:8000/apps.post/api/posts/"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_url_is_trimmed() {
        let client = ApiClient::new("https://photos.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://photos.example.com");
        assert_eq!(
            client.posts_url(),
            "https://photos.example.com/apps.post/api/posts/"
        );
    }

    #[test]
    fn test_extract_post_id_from_numeric_id() {
        assert_eq!(
            extract_post_id(r#"{"id": 42, "caption": "hello"}"#),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_extract_post_id_from_string_id() {
        assert_eq!(
            extract_post_id(r#"{"id": "42"}"#),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_extract_post_id_handles_junk() {
        assert_eq!(extract_post_id(""), None);
        assert_eq!(extract_post_id("not json"), None);
        assert_eq!(extract_post_id(r#"{"caption": "no id here"}"#), None);
    }
}
