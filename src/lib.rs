//! Motor de ingreso de inspecciones municipales
//!
//! Núcleo del formulario de 4 pasos: esquema declarativo de validación,
//! resolución de secciones condicionales, gestión de fotos adjuntas y
//! orquestación del envío (subida secuencial de fotos al mejor esfuerzo +
//! creación del registro vía REST).

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod payload;
pub mod photos;
pub mod sanitize;
pub mod submit;
pub mod uploader;
pub mod wizard;

pub use api::{CreatedInspection, HttpApi, InspectionsApi};
pub use error::{InspeccionError, Result};
pub use form::steps::{NavOutcome, Step, StepNavigator};
pub use form::{ApplicantType, ConstructionProcedure, Dependency, District, FormState};
pub use payload::{build_payload, SubmissionPayload, UploadedPhotos};
pub use photos::{AttachOutcome, PhotoFile, PhotoManager};
pub use submit::IntakeForm;
pub use uploader::{AssetUploader, CloudinaryUploader};
