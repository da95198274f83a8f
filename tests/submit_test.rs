//! Pruebas del envío de extremo a extremo
//!
//! Con subidor y backend simulados: subida al mejor esfuerzo, firma
//! crítica, reinicio tras el éxito y preservación del estado tras un fallo.

use async_trait::async_trait;
use inspecciones::api::{CreatedInspection, InspectionsApi};
use inspecciones::error::{InspeccionError, Result};
use inspecciones::form::Dependency;
use inspecciones::payload::SubmissionPayload;
use inspecciones::photos::PhotoFile;
use inspecciones::submit::IntakeForm;
use inspecciones::uploader::AssetUploader;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// Subidor simulado: falla para los nombres de archivo indicados y
/// registra lo que subió.
struct ScriptedUploader {
    fail_names: HashSet<String>,
    uploaded: Mutex<Vec<String>>,
}

impl ScriptedUploader {
    fn new(fail_names: &[&str]) -> Self {
        ScriptedUploader {
            fail_names: fail_names.iter().map(|s| s.to_string()).collect(),
            uploaded: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AssetUploader for ScriptedUploader {
    async fn upload(&self, file: &PhotoFile) -> Result<String> {
        if self.fail_names.contains(&file.file_name) {
            return Err(InspeccionError::Api("fallo de red simulado".to_string()));
        }
        self.uploaded.lock().unwrap().push(file.file_name.clone());
        Ok(format!("https://assets/{}", file.file_name))
    }
}

/// Backend simulado: guarda los payloads recibidos y puede fallar.
struct CapturingApi {
    payloads: Mutex<Vec<SubmissionPayload>>,
    fail_with: Option<String>,
}

impl CapturingApi {
    fn ok() -> Self {
        CapturingApi {
            payloads: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    fn failing(message: &str) -> Self {
        CapturingApi {
            payloads: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

#[async_trait]
impl InspectionsApi for CapturingApi {
    async fn create_inspection(&self, payload: &SubmissionPayload) -> Result<CreatedInspection> {
        self.payloads.lock().unwrap().push(payload.clone());
        if let Some(message) = &self.fail_with {
            return Err(InspeccionError::Api(message.clone()));
        }
        Ok(CreatedInspection {
            id: serde_json::json!(7),
        })
    }
}

fn photo(name: &str) -> PhotoFile {
    PhotoFile {
        file_name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
        size_bytes: 4096,
        path: PathBuf::from(name),
    }
}

/// Formulario de ZMT válido, llevado hasta el paso 4 por el navegador.
fn zmt_form() -> IntakeForm {
    let mut form = IntakeForm::new();
    form.state.inspection_date = "2025-03-14".to_string();
    form.state.procedure_number = "INS-2025-041".to_string();
    form.state.inspector_ids = vec!["3".to_string()];
    form.state.location.exact_address = "Playa Sámara, sector norte".to_string();
    form.state.dependency = Some(Dependency::ZmtConcession);
    form.state.zmt.file_number = "EXP-2021-10".to_string();
    form.state.zmt.concession_type = "Comercial".to_string();
    form.state.zmt.granted_at = "2021-06-01".to_string();
    form.state.zmt.expires_at = "2041-06-01".to_string();
    form.state.zmt.parcels[0].plan_number = "P-55821".to_string();

    for (slot, name) in [("zmt1", "zmt-a.jpg"), ("zmt2", "zmt-b.jpg"), ("zmt3", "zmt-c.jpg")] {
        form.photos.attach(slot, Some(photo(name))).unwrap();
    }

    for _ in 0..3 {
        form.navigator.next(&form.state, &mut form.photos);
    }
    assert!(form.navigator.can_submit(), "el formulario no llegó al paso 4");
    form
}

/// Formulario de Cobros válido con firma adjunta, en el paso 4.
fn collection_form() -> IntakeForm {
    let mut form = IntakeForm::new();
    form.state.inspection_date = "2025-03-14".to_string();
    form.state.procedure_number = "COB-12".to_string();
    form.state.inspector_ids = vec!["5".to_string()];
    form.state.location.exact_address = "Barrio La Cananga".to_string();
    form.state.dependency = Some(Dependency::Collection);
    form.photos.attach("firma", Some(photo("firma.png"))).unwrap();

    for _ in 0..3 {
        form.navigator.next(&form.state, &mut form.photos);
    }
    assert!(form.navigator.can_submit());
    form
}

/// Propiedad 6: si una de tres subidas falla, el envío procede con las dos
/// URL restantes; la foto fallida simplemente se omite del payload.
#[tokio::test]
async fn test_failed_documentation_upload_is_omitted() {
    let mut form = zmt_form();
    let uploader = ScriptedUploader::new(&["zmt-b.jpg"]);
    let api = CapturingApi::ok();

    let created = form.submit(&uploader, &api).await.unwrap();
    assert_eq!(created.id, serde_json::json!(7));

    let payloads = api.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    let zmt = payloads[0].zmt_concession.as_ref().unwrap();
    assert_eq!(
        zmt.photos,
        vec![
            "https://assets/zmt-a.jpg".to_string(),
            "https://assets/zmt-c.jpg".to_string(),
        ]
    );
}

/// Propiedad 7: tras un envío exitoso todo vuelve al estado inicial.
#[tokio::test]
async fn test_success_resets_everything() {
    let mut form = zmt_form();
    let uploader = ScriptedUploader::new(&[]);
    let api = CapturingApi::ok();

    form.submit(&uploader, &api).await.unwrap();

    assert_eq!(form.navigator.current().number(), 1);
    assert!(!form.navigator.can_submit());
    assert!(!form.is_submitting());
    assert_eq!(form.state.procedure_number, "");
    assert!(form.state.dependency.is_none());
    assert_eq!(form.state.zmt.parcels.len(), 1);
    assert_eq!(form.state.zmt.parcels[0].plan_number, "");
    for slot in ["zmt1", "zmt2", "zmt3", "firma"] {
        assert!(!form.photos.is_populated(slot), "casilla {} quedó poblada", slot);
    }
}

/// Un fallo del backend deja el formulario intacto para reintentar.
#[tokio::test]
async fn test_api_failure_preserves_state() {
    let mut form = zmt_form();
    let uploader = ScriptedUploader::new(&[]);
    let api = CapturingApi::failing("El número de trámite ya existe");

    let result = form.submit(&uploader, &api).await;
    match result {
        Err(InspeccionError::Api(message)) => {
            assert_eq!(message, "El número de trámite ya existe");
        }
        other => panic!("se esperaba Api, fue {:?}", other),
    }

    assert_eq!(form.state.procedure_number, "INS-2025-041");
    assert!(form.navigator.can_submit());
    assert!(form.photos.is_populated("zmt1"));
    assert!(!form.is_submitting());
    assert_eq!(api.calls(), 1);
}

/// La firma es crítica: su fallo aborta antes de crear el registro.
#[tokio::test]
async fn test_signature_upload_failure_aborts() {
    let mut form = collection_form();
    let uploader = ScriptedUploader::new(&["firma.png"]);
    let api = CapturingApi::ok();

    let result = form.submit(&uploader, &api).await;
    assert!(matches!(result, Err(InspeccionError::SignatureUpload(_))));
    assert_eq!(api.calls(), 0, "no debió llegar al backend");
    assert!(form.photos.is_populated("firma"));
    assert!(form.navigator.can_submit());
}

/// La URL de la firma viaja en el sub-objeto de Cobros.
#[tokio::test]
async fn test_signature_url_lands_in_collection_payload() {
    let mut form = collection_form();
    let uploader = ScriptedUploader::new(&[]);
    let api = CapturingApi::ok();

    form.submit(&uploader, &api).await.unwrap();

    let payloads = api.payloads.lock().unwrap();
    let collection = payloads[0].collection.as_ref().unwrap();
    assert_eq!(
        collection.notifier_signature_url.as_deref(),
        Some("https://assets/firma.png")
    );
}

/// Un formulario reiniciado admite un segundo envío completo.
#[tokio::test]
async fn test_form_is_reusable_after_success() {
    let mut form = zmt_form();
    let uploader = ScriptedUploader::new(&[]);
    let api = CapturingApi::ok();
    form.submit(&uploader, &api).await.unwrap();

    // segundo recorrido con los mismos buffers
    form.state.inspection_date = "2025-04-02".to_string();
    form.state.procedure_number = "INS-2025-090".to_string();
    form.state.inspector_ids = vec!["4".to_string()];
    form.state.location.exact_address = "Nosara centro".to_string();
    form.state.dependency = Some(Dependency::MayorOffice);
    form.state.mayor_office.procedure_type = "Denuncia".to_string();
    for (slot, name) in [("mo1", "m1.jpg"), ("mo2", "m2.jpg"), ("mo3", "m3.jpg")] {
        form.photos.attach(slot, Some(photo(name))).unwrap();
    }
    for _ in 0..3 {
        form.navigator.next(&form.state, &mut form.photos);
    }

    form.submit(&uploader, &api).await.unwrap();
    let payloads = api.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 2);
    assert!(payloads[1].mayor_office.is_some());
    assert!(payloads[1].zmt_concession.is_none());
}
