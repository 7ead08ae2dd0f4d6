use crate::errors::AppResult;
use reqwest::multipart;
use std::path::Path;

/// Field name the API reads attached images from, one part per image.
pub const IMAGE_FIELD: &str = "uploaded_images";
/// Field name for the caption text.
pub const CAPTION_FIELD: &str = "caption";

/// Helper struct to hold the multipart body of one post submission
#[derive(Debug, Clone, Default)]
pub struct PostPayload {
    files: Vec<(String, Vec<u8>, String)>, // (filename, data, mime_type)
    text_fields: Vec<(String, String)>,
}

impl PostPayload {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            text_fields: Vec::new(),
        }
    }

    pub async fn add_image(&mut self, file_path: &str) -> AppResult<()> {
        let file_contents = tokio::fs::read(file_path).await?;
        let filename = Path::new(file_path)
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let mime_type = mime_for_path(file_path);

        self.files
            .push((filename, file_contents, mime_type.to_string()));
        Ok(())
    }

    /// An empty selection still produces one blank `uploaded_images` entry;
    /// the API expects the field to be present on every post.
    pub fn add_blank_image_field(&mut self) {
        self.text_fields.push((IMAGE_FIELD.to_string(), String::new()));
    }

    /// The caption is appended whether or not it is empty.
    pub fn add_caption(&mut self, caption: &str) {
        self.text_fields
            .push((CAPTION_FIELD.to_string(), caption.to_string()));
    }

    pub fn image_count(&self) -> usize {
        self.files.len()
    }

    pub fn build_form(&self) -> AppResult<multipart::Form> {
        let mut form = multipart::Form::new();

        // Image parts first, in selection order
        for (filename, data, mime_type) in &self.files {
            let part = multipart::Part::bytes(data.clone())
                .file_name(filename.clone())
                .mime_str(mime_type)?;

            form = form.part(IMAGE_FIELD, part);
        }

        for (key, value) in &self.text_fields {
            form = form.text(key.clone(), value.clone());
        }

        Ok(form)
    }
}

/// Detect MIME type based on file extension
fn mime_for_path(file_path: &str) -> &'static str {
    match Path::new(file_path).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png", // Default fallback
    }
}
