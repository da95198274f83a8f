//! Orquestador de envío
//!
//! Flujo: compuerta final de validación → subida secuencial de fotos →
//! armado del payload → una sola llamada de creación. Las fotos de
//! documentación se suben al mejor esfuerzo (un fallo se registra y la
//! foto se omite); la firma de Cobros es crítica y su fallo aborta el
//! envío. Éxito: estado completo a valores iniciales. Fallo: estado
//! intacto para reintentar.
//!
//! Máquina de estados: `Editando(paso 1..4) → Enviando →
//! { Éxito → Editando(paso 1, reiniciado) | Fallo → Editando(paso 4, intacto) }`.

use crate::api::{CreatedInspection, InspectionsApi};
use crate::error::{InspeccionError, Result};
use crate::form::steps::{Step, StepNavigator};
use crate::form::{rules, sections, Dependency, FormState};
use crate::payload::{self, UploadedPhotos};
use crate::photos::{slots, PhotoManager};
use crate::uploader::AssetUploader;

/// Sube en secuencia las fotos pobladas de las casillas indicadas,
/// recolectando las URL en el orden de las casillas. Un fallo individual
/// se registra y se omite; nunca aborta las subidas restantes.
pub async fn upload_documentation(
    photos: &PhotoManager,
    slot_keys: &[&str],
    uploader: &dyn AssetUploader,
) -> Vec<String> {
    let mut urls = Vec::new();
    for &key in slot_keys {
        let Some(file) = photos.file(key) else {
            continue;
        };
        match uploader.upload(file).await {
            Ok(url) => urls.push(url),
            Err(err) => {
                tracing::warn!(slot = key, error = %err, "subida de foto omitida");
            }
        }
    }
    urls
}

/// Formulario de ingreso completo: estado, fotos y navegación, más la
/// bandera `submitting` que impide envíos repetidos mientras hay uno en
/// curso (no hay cancelación del envío ya iniciado).
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub state: FormState,
    pub photos: PhotoManager,
    pub navigator: StepNavigator,
    submitting: bool,
}

impl IntakeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Envía la inspección. Solo disponible en el paso 4.
    pub async fn submit(
        &mut self,
        uploader: &dyn AssetUploader,
        api: &dyn InspectionsApi,
    ) -> Result<CreatedInspection> {
        if self.submitting {
            return Err(InspeccionError::SubmitInFlight);
        }
        self.submitting = true;
        let result = self.submit_inner(uploader, api).await;
        self.submitting = false;

        if result.is_ok() {
            self.reset();
        }
        result
    }

    async fn submit_inner(
        &mut self,
        uploader: &dyn AssetUploader,
        api: &dyn InspectionsApi,
    ) -> Result<CreatedInspection> {
        if !self.navigator.can_submit() {
            return Err(InspeccionError::Incomplete(
                "el envío solo está disponible en el último paso".to_string(),
            ));
        }
        let dependency = self.state.dependency.ok_or_else(|| {
            InspeccionError::Incomplete("dependencia sin seleccionar".to_string())
        })?;
        let procedure = self.state.constructions.procedure;

        // Compuerta final: revalida campos y fotos requeridas aunque la
        // navegación ya lo haya hecho (el usuario pudo saltarse el paso)
        let violations = rules::validate_step(&self.state, &self.photos, Step::Details);
        let plan = sections::resolve(dependency, procedure);
        let photo_check = self.photos.validate_required(plan.required_photo_slots);
        if !violations.is_empty() || !photo_check.ok() {
            self.navigator.flag_errors(Step::Details);
            return Err(InspeccionError::Incomplete(
                "hay campos o fotos requeridas sin completar".to_string(),
            ));
        }

        tracing::info!(dependency = ?dependency, "iniciando envío de inspección");

        // La firma es crítica: su fallo aborta antes de la creación
        let signature_url = if dependency == Dependency::Collection {
            match self.photos.file(slots::SIGNATURE) {
                Some(file) => Some(
                    uploader
                        .upload(file)
                        .await
                        .map_err(|e| InspeccionError::SignatureUpload(e.to_string()))?,
                ),
                None => None,
            }
        } else {
            None
        };

        let slot_keys = sections::dependency_slots(dependency, procedure);
        let urls = upload_documentation(&self.photos, slot_keys, uploader).await;

        let uploaded = UploadedPhotos {
            urls,
            signature_url,
        };
        let body = payload::build_payload(&self.state, &uploaded)?;
        let created = api.create_inspection(&body).await?;

        tracing::info!(id = %created.id, "inspección creada");
        Ok(created)
    }

    /// Restaura formulario, fotos y navegación a su estado inicial.
    fn reset(&mut self) {
        self.state.reset();
        self.photos.reset();
        self.navigator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::PhotoFile;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct NoopUploader;

    #[async_trait]
    impl AssetUploader for NoopUploader {
        async fn upload(&self, file: &PhotoFile) -> Result<String> {
            Ok(format!("https://assets/{}", file.file_name))
        }
    }

    struct RecordingApi {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl InspectionsApi for RecordingApi {
        async fn create_inspection(
            &self,
            _payload: &crate::payload::SubmissionPayload,
        ) -> Result<CreatedInspection> {
            *self.calls.lock().unwrap() += 1;
            Ok(CreatedInspection {
                id: serde_json::json!(1),
            })
        }
    }

    #[tokio::test]
    async fn test_submit_rejected_outside_final_step() {
        let mut form = IntakeForm::new();
        let api = RecordingApi {
            calls: Mutex::new(0),
        };
        let result = form.submit(&NoopUploader, &api).await;
        assert!(matches!(result, Err(InspeccionError::Incomplete(_))));
        assert_eq!(*api.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_final_gate_blocks_incomplete_form() {
        let mut form = IntakeForm::new();
        // forzar el paso 4 sin llenar nada
        let mut state = FormState::new();
        state.inspection_date = "2025-03-14".to_string();
        state.procedure_number = "T-1".to_string();
        state.inspector_ids = vec!["1".to_string()];
        state.location.exact_address = "dirección".to_string();
        state.dependency = Some(Dependency::MayorOffice);
        form.state = state;
        form.navigator.next(&form.state, &mut form.photos);
        form.navigator.next(&form.state, &mut form.photos);
        form.navigator.next(&form.state, &mut form.photos);
        assert!(form.navigator.can_submit());

        let api = RecordingApi {
            calls: Mutex::new(0),
        };
        let result = form.submit(&NoopUploader, &api).await;
        assert!(matches!(result, Err(InspeccionError::Incomplete(_))));
        assert!(form.navigator.show_errors(Step::Details));
        assert_eq!(*api.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upload_documentation_skips_empty_slots() {
        let mut photos = PhotoManager::new();
        photos
            .attach(
                "mo2",
                Some(PhotoFile {
                    file_name: "unica.jpg".to_string(),
                    mime_type: "image/jpeg".to_string(),
                    size_bytes: 10,
                    path: PathBuf::from("unica.jpg"),
                }),
            )
            .unwrap();

        let urls = upload_documentation(&photos, &["mo1", "mo2", "mo3"], &NoopUploader).await;
        assert_eq!(urls, vec!["https://assets/unica.jpg".to_string()]);
    }
}
