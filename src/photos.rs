//! Gestión de fotos adjuntas
//!
//! Cada casilla (`slot`) guarda a lo sumo un archivo pendiente y su mensaje
//! de error. Un archivo se acepta solo si pasa todas las comprobaciones, en
//! orden estricto: tipo → nombre → extensión → tamaño → largo del nombre →
//! contenido no vacío. La primera comprobación que falla determina el
//! mensaje; no hay aceptación parcial.

use crate::error::{InspeccionError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Claves fijas de las casillas de foto.
pub mod slots {
    pub const MAYOR_OFFICE: &[&str] = &["mo1", "mo2", "mo3"];
    pub const ANTIQUITY: &[&str] = &["antiguedad1", "antiguedad2", "antiguedad3"];
    pub const PC_CANCELLATION: &[&str] = &["cancelacionPc1"];
    pub const GENERAL_INSPECTION: &[&str] = &["inspeccionGeneral1"];
    pub const WORK_RECEIVED: &[&str] = &["recibidoObra1"];
    pub const ZMT: &[&str] = &["zmt1", "zmt2", "zmt3"];
    pub const WORK_CLOSURE: &[&str] = &["clausura1", "clausura2", "clausura3"];

    /// Firma del notificado (dependencia Cobros). Crítica para el envío.
    pub const SIGNATURE: &str = "firma";

    pub const ALL: &[&str] = &[
        "mo1",
        "mo2",
        "mo3",
        "antiguedad1",
        "antiguedad2",
        "antiguedad3",
        "cancelacionPc1",
        "inspeccionGeneral1",
        "recibidoObra1",
        "zmt1",
        "zmt2",
        "zmt3",
        "clausura1",
        "clausura2",
        "clausura3",
        SIGNATURE,
    ];
}

/// Tamaño máximo aceptado por foto (10MB).
pub const MAX_PHOTO_BYTES: u64 = 10_485_760;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const MAX_FILE_NAME_LEN: usize = 255;

pub const MSG_NOT_IMAGE: &str = "El archivo debe ser una imagen";
pub const MSG_BAD_FILE_NAME: &str = "El nombre del archivo contiene caracteres no permitidos";
pub const MSG_BAD_EXTENSION: &str = "Formato no permitido: use jpg, jpeg, png, webp o gif";
pub const MSG_TOO_LARGE: &str = "La imagen supera el tamaño máximo de 10MB";
pub const MSG_NAME_TOO_LONG: &str = "El nombre del archivo es demasiado largo";
pub const MSG_EMPTY_FILE: &str = "El archivo está vacío";
pub const MSG_REQUIRED: &str = "Este campo es requerido";

lazy_static! {
    static ref SAFE_FILE_NAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9 ._()\-]+$").expect("regex SAFE_FILE_NAME_RE");
}

/// Referencia a un archivo de foto pendiente de subir.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub path: std::path::PathBuf,
}

impl PhotoFile {
    /// Construye la referencia desde un archivo en disco, derivando el tipo
    /// MIME de la extensión.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(InspeccionError::FileNotFound(path.display().to_string()));
        }
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        };
        Ok(PhotoFile {
            file_name,
            mime_type: mime_type.to_string(),
            size_bytes: metadata.len(),
            path: path.to_path_buf(),
        })
    }
}

/// Comprueba un archivo en el orden fijo; devuelve el primer mensaje de
/// error, o `None` si el archivo es aceptable.
pub fn validate_file(file: &PhotoFile) -> Option<&'static str> {
    if !file.mime_type.starts_with("image/") {
        return Some(MSG_NOT_IMAGE);
    }
    if !SAFE_FILE_NAME_RE.is_match(&file.file_name) {
        return Some(MSG_BAD_FILE_NAME);
    }
    let extension = file
        .file_name
        .rsplit('.')
        .next()
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Some(MSG_BAD_EXTENSION);
    }
    if file.size_bytes > MAX_PHOTO_BYTES {
        return Some(MSG_TOO_LARGE);
    }
    if file.file_name.chars().count() > MAX_FILE_NAME_LEN {
        return Some(MSG_NAME_TOO_LONG);
    }
    if file.size_bytes == 0 {
        return Some(MSG_EMPTY_FILE);
    }
    None
}

/// Una casilla: archivo pendiente + error visible.
#[derive(Debug, Clone, Default)]
pub struct PhotoSlot {
    pub file: Option<PhotoFile>,
    pub error: Option<String>,
}

/// Resultado de `attach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    Stored,
    Cleared,
    Rejected(String),
}

/// Resultado de la comprobación de fotos requeridas.
#[derive(Debug, Clone, Default)]
pub struct RequiredCheck {
    pub missing: Vec<&'static str>,
}

impl RequiredCheck {
    pub fn ok(&self) -> bool {
        self.missing.is_empty()
    }

    /// Primera casilla faltante, para enfocarla en la interfaz.
    pub fn first_missing(&self) -> Option<&'static str> {
        self.missing.first().copied()
    }
}

/// Mapa de casillas con clave fija, creado vacío al montar el formulario.
#[derive(Debug, Clone)]
pub struct PhotoManager {
    slots: HashMap<&'static str, PhotoSlot>,
}

impl PhotoManager {
    pub fn new() -> Self {
        let slots = slots::ALL
            .iter()
            .map(|&key| (key, PhotoSlot::default()))
            .collect();
        PhotoManager { slots }
    }

    fn canonical_key(key: &str) -> Result<&'static str> {
        slots::ALL
            .iter()
            .copied()
            .find(|&k| k == key)
            .ok_or_else(|| InspeccionError::UnknownSlot(key.to_string()))
    }

    /// Adjunta o quita el archivo de una casilla.
    ///
    /// Con `None` la casilla y su error se limpian incondicionalmente. Con
    /// un archivo, se valida en orden estricto y solo se guarda si pasa
    /// todas las comprobaciones.
    pub fn attach(&mut self, key: &str, file: Option<PhotoFile>) -> Result<AttachOutcome> {
        let key = Self::canonical_key(key)?;
        let slot = self.slots.get_mut(key).expect("casilla fija");

        let Some(file) = file else {
            slot.file = None;
            slot.error = None;
            return Ok(AttachOutcome::Cleared);
        };

        if let Some(message) = validate_file(&file) {
            slot.error = Some(message.to_string());
            return Ok(AttachOutcome::Rejected(message.to_string()));
        }

        slot.file = Some(file);
        slot.error = None;
        Ok(AttachOutcome::Stored)
    }

    pub fn file(&self, key: &str) -> Option<&PhotoFile> {
        self.slots.get(key).and_then(|s| s.file.as_ref())
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(|s| s.error.as_deref())
    }

    pub fn is_populated(&self, key: &str) -> bool {
        self.file(key).is_some()
    }

    /// Compara el conjunto requerido contra las casillas pobladas; cada
    /// faltante recibe el mensaje de campo requerido.
    pub fn validate_required(&mut self, required: &[&'static str]) -> RequiredCheck {
        let mut missing = Vec::new();
        for &key in required {
            let slot = self.slots.get_mut(key).expect("casilla fija");
            if slot.file.is_none() {
                slot.error = Some(MSG_REQUIRED.to_string());
                missing.push(key);
            }
        }
        RequiredCheck { missing }
    }

    /// Vacía todas las casillas y sus errores.
    pub fn reset(&mut self) {
        for slot in self.slots.values_mut() {
            slot.file = None;
            slot.error = None;
        }
    }
}

impl Default for PhotoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn photo(name: &str, mime: &str, size: u64) -> PhotoFile {
        PhotoFile {
            file_name: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes: size,
            path: PathBuf::from(name),
        }
    }

    #[test]
    fn test_valid_photo_is_stored() {
        let mut manager = PhotoManager::new();
        let outcome = manager
            .attach("mo1", Some(photo("fachada.jpg", "image/jpeg", 2048)))
            .unwrap();
        assert_eq!(outcome, AttachOutcome::Stored);
        assert!(manager.is_populated("mo1"));
        assert!(manager.error("mo1").is_none());
    }

    #[test]
    fn test_oversized_png_reports_exactly_size_error() {
        // 15MB con nombre y tipo válidos: debe fallar por tamaño, no por
        // tipo ni por nombre
        let mut manager = PhotoManager::new();
        let outcome = manager
            .attach("zmt1", Some(photo("ok.png", "image/png", 15 * 1024 * 1024)))
            .unwrap();
        assert_eq!(outcome, AttachOutcome::Rejected(MSG_TOO_LARGE.to_string()));
        assert_eq!(manager.error("zmt1"), Some(MSG_TOO_LARGE));
        assert!(!manager.is_populated("zmt1"));
    }

    #[test]
    fn test_check_order_type_first() {
        // Tipo inválido gana aunque el nombre también sea inválido
        let file = photo("mal<>.txt", "text/plain", 10);
        assert_eq!(validate_file(&file), Some(MSG_NOT_IMAGE));
    }

    #[test]
    fn test_check_order_name_before_extension() {
        let file = photo("foto\u{7}.bmp", "image/bmp", 10);
        assert_eq!(validate_file(&file), Some(MSG_BAD_FILE_NAME));
    }

    #[test]
    fn test_check_order_extension_before_size() {
        let file = photo("foto.bmp", "image/bmp", MAX_PHOTO_BYTES + 1);
        assert_eq!(validate_file(&file), Some(MSG_BAD_EXTENSION));
    }

    #[test]
    fn test_check_order_size_before_name_length() {
        let long_name = format!("{}.jpg", "a".repeat(300));
        let file = photo(&long_name, "image/jpeg", MAX_PHOTO_BYTES + 1);
        assert_eq!(validate_file(&file), Some(MSG_TOO_LARGE));
    }

    #[test]
    fn test_name_length_before_emptiness() {
        let long_name = format!("{}.jpg", "a".repeat(300));
        let file = photo(&long_name, "image/jpeg", 0);
        assert_eq!(validate_file(&file), Some(MSG_NAME_TOO_LONG));
    }

    #[test]
    fn test_empty_file_rejected_last() {
        let file = photo("vacia.jpg", "image/jpeg", 0);
        assert_eq!(validate_file(&file), Some(MSG_EMPTY_FILE));
    }

    #[test]
    fn test_exact_limit_is_accepted() {
        let file = photo("limite.jpg", "image/jpeg", MAX_PHOTO_BYTES);
        assert_eq!(validate_file(&file), None);
    }

    #[test]
    fn test_attach_none_clears_slot_and_error() {
        let mut manager = PhotoManager::new();
        manager
            .attach("mo1", Some(photo("x.txt", "text/plain", 10)))
            .unwrap();
        assert!(manager.error("mo1").is_some());

        let outcome = manager.attach("mo1", None).unwrap();
        assert_eq!(outcome, AttachOutcome::Cleared);
        assert!(manager.error("mo1").is_none());
        assert!(!manager.is_populated("mo1"));
    }

    #[test]
    fn test_unknown_slot_is_an_error() {
        let mut manager = PhotoManager::new();
        let result = manager.attach("inexistente", None);
        assert!(matches!(
            result,
            Err(crate::error::InspeccionError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_validate_required_reports_missing_in_order() {
        let mut manager = PhotoManager::new();
        manager
            .attach("mo1", Some(photo("a.jpg", "image/jpeg", 100)))
            .unwrap();

        let check = manager.validate_required(&["mo1", "mo2", "mo3"]);
        assert!(!check.ok());
        assert_eq!(check.missing, vec!["mo2", "mo3"]);
        assert_eq!(check.first_missing(), Some("mo2"));
        assert_eq!(manager.error("mo2"), Some(MSG_REQUIRED));
        assert_eq!(manager.error("mo3"), Some(MSG_REQUIRED));
        assert!(manager.error("mo1").is_none());
    }

    #[test]
    fn test_reset_empties_all_slots() {
        let mut manager = PhotoManager::new();
        manager
            .attach("firma", Some(photo("firma.png", "image/png", 50)))
            .unwrap();
        manager.validate_required(&["zmt1"]);

        manager.reset();
        assert!(!manager.is_populated("firma"));
        assert!(manager.error("zmt1").is_none());
    }
}
