//! Image reference resolution: remote object URL, or an embedded data URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use uuid::Uuid;

use super::Store;

/// An image file submitted by the admin.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("bin")
    }

    /// Declared content type, else a guess from the file extension.
    pub fn mime_type(&self) -> String {
        if let Some(content_type) = self.content_type.as_deref().filter(|c| !c.is_empty()) {
            return content_type.to_string();
        }
        match self.extension().to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
        .to_string()
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    fn object_name(&self) -> String {
        format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            self.extension()
        )
    }
}

impl Store {
    /// Turn an image into a reference usable as `image_url`. Never fails: when the
    /// bucket is unavailable the image is embedded as a data URI.
    pub async fn upload_image(&self, upload: ImageUpload) -> String {
        let name = upload.object_name();
        let mime = upload.mime_type();
        let stored = self
            .attempt_remote("upload image", |remote| {
                remote.upload_object(&name, &mime, upload.bytes.clone())
            })
            .await;

        match stored {
            Some(url) => url,
            None => upload.to_data_uri(),
        }
    }
}
