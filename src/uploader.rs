//! Subida de fotos al alojamiento remoto
//!
//! `POST /cloudinary/upload` con formulario multipart (campo `file`) y
//! token bearer; responde `{ "secure_url": "..." }`. Se llama una vez por
//! foto, en secuencia.

use crate::api::error_from_response;
use crate::error::Result;
use crate::photos::PhotoFile;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Destino de subida de fotos, inyectable para pruebas.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Sube un archivo y devuelve su URL pública.
    async fn upload(&self, file: &PhotoFile) -> Result<String>;
}

/// Implementación real contra el endpoint de Cloudinary del backend.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CloudinaryUploader {
    pub fn new(base_url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(CloudinaryUploader {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl AssetUploader for CloudinaryUploader {
    async fn upload(&self, file: &PhotoFile) -> Result<String> {
        let url = format!("{}/cloudinary/upload", self.base_url);
        tracing::debug!(file = %file.file_name, "subiendo foto");

        let bytes = tokio::fs::read(&file.path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "No se pudo subir la foto").await);
        }

        let body = response.json::<UploadResponse>().await?;
        Ok(body.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_parses_secure_url() {
        let body: UploadResponse = serde_json::from_str(
            r#"{"secure_url": "https://res.cloudinary.com/x/a.jpg", "public_id": "a"}"#,
        )
        .unwrap();
        assert_eq!(body.secure_url, "https://res.cloudinary.com/x/a.jpg");
    }
}
