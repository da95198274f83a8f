//! Saneamiento de texto libre
//!
//! Todos los campos de texto libre del formulario pasan por aquí antes de
//! aceptarse:
//! - Las etiquetas `<script>` y HTML en general se eliminan.
//! - Las secuencias con metacaracteres SQL se rechazan; el rechazo se
//!   reporta como violación de validación, nunca como transformación
//!   silenciosa.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_RE: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("regex SCRIPT_RE");
    static ref HTML_TAG_RE: Regex = Regex::new(r"(?s)<[^>]*>").expect("regex HTML_TAG_RE");
    static ref SQL_META_RE: Regex = Regex::new(
        r"(?i)('|--|;|/\*|\*/|\b(select|insert|update|delete|drop|union|exec)\b)"
    )
    .expect("regex SQL_META_RE");
}

/// Mensaje de violación cuando el texto contiene secuencias peligrosas.
pub const UNSAFE_TEXT_MESSAGE: &str = "El texto contiene caracteres no permitidos";

/// Quita etiquetas `<script>` y HTML en general, y recorta espacios.
pub fn strip_tags(input: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(input, "");
    let without_tags = HTML_TAG_RE.replace_all(&without_scripts, "");
    without_tags.trim().to_string()
}

/// Limpia un texto libre: quita etiquetas y rechaza metacaracteres SQL.
///
/// Los metacaracteres se buscan tanto en el texto original como en el
/// texto ya sin etiquetas; una etiqueta no puede enmascarar una secuencia
/// peligrosa ni producir una al eliminarse.
///
/// Devuelve el texto limpio, o `Err` con el mensaje de violación.
pub fn sanitize(input: &str) -> Result<String, &'static str> {
    if SQL_META_RE.is_match(input) {
        return Err(UNSAFE_TEXT_MESSAGE);
    }

    let cleaned = strip_tags(input);
    if SQL_META_RE.is_match(&cleaned) {
        return Err(UNSAFE_TEXT_MESSAGE);
    }

    Ok(cleaned)
}

/// `true` si el texto pasaría el saneamiento sin rechazo.
pub fn is_safe(input: &str) -> bool {
    sanitize(input).is_ok()
}
