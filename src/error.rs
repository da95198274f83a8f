use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspeccionError {
    #[error("Error de configuración: {0}")]
    Config(String),

    #[error("Token de acceso no configurado. Use `inspecciones config --set-token SU_TOKEN` para configurarlo")]
    MissingToken,

    #[error("Token inválido: {0}")]
    InvalidToken(String),

    #[error("Archivo no encontrado: {0}")]
    FileNotFound(String),

    #[error("Espacio de foto desconocido: {0}")]
    UnknownSlot(String),

    #[error("El formulario tiene campos pendientes: {0}")]
    Incomplete(String),

    #[error("Ya hay un envío en curso")]
    SubmitInFlight,

    #[error("Error al subir la firma del notificado: {0}")]
    SignatureUpload(String),

    #[error("Error de red: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Api(String),

    #[error("Error al interpretar JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error de entrada interactiva: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, InspeccionError>;
