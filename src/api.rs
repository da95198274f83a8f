//! Cliente del backend de inspecciones
//!
//! `POST /inspections` con el payload completo. Las respuestas no exitosas
//! traen `{ "message": "..." }`; ese mensaje se extrae para mostrarlo al
//! usuario tal cual, con un genérico como respaldo.

use crate::error::{InspeccionError, Result};
use crate::payload::SubmissionPayload;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Registro creado por el backend.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedInspection {
    /// El backend puede devolver el id como número o como texto.
    pub id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: Option<String>,
}

/// Extrae el mensaje reportado por el servidor, o usa el genérico.
pub(crate) async fn error_from_response(
    response: reqwest::Response,
    fallback: &str,
) -> InspeccionError {
    let status = response.status();
    let message = response
        .json::<ServerMessage>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("{} (HTTP {})", fallback, status.as_u16()));
    InspeccionError::Api(message)
}

/// Punto de creación de inspecciones, inyectable para pruebas.
#[async_trait]
pub trait InspectionsApi: Send + Sync {
    async fn create_inspection(&self, payload: &SubmissionPayload) -> Result<CreatedInspection>;
}

/// Implementación HTTP real contra el backend REST.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpApi {
    pub fn new(base_url: &str, token: &str, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(HttpApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl InspectionsApi for HttpApi {
    async fn create_inspection(&self, payload: &SubmissionPayload) -> Result<CreatedInspection> {
        let url = format!("{}/inspections", self.base_url);
        tracing::debug!(url = %url, "creando inspección");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "No se pudo crear la inspección").await);
        }

        Ok(response.json::<CreatedInspection>().await?)
    }
}
