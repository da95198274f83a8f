//! Sesión de autenticación
//!
//! La decodificación del JWT es una función pura (`decode_token`),
//! comprobable en aislamiento; el estado de sesión vive en `AuthSession`,
//! un servicio inyectable con `current_user`/`login`/`logout`. La firma
//! del token no se verifica aquí: eso es tarea del backend.

use crate::error::{InspeccionError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// Reclamos del token de acceso.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// `true` si el token expiró respecto al instante dado (epoch en
    /// segundos). Sin `exp`, el token no expira.
    pub fn is_expired_at(&self, now_epoch: i64) -> bool {
        self.exp.map(|exp| exp < now_epoch).unwrap_or(false)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

/// Decodifica el payload de un JWT sin verificar la firma.
pub fn decode_token(token: &str) -> Result<Claims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(InspeccionError::InvalidToken(
            "se esperaban tres segmentos".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| InspeccionError::InvalidToken(format!("base64 inválido: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| InspeccionError::InvalidToken(format!("payload inválido: {}", e)))
}

/// Contexto de autenticación del cliente.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    token: Option<String>,
    claims: Option<Claims>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra el token tras decodificarlo; un token ilegible se rechaza.
    pub fn login(&mut self, token: &str) -> Result<&Claims> {
        let claims = decode_token(token)?;
        self.token = Some(token.to_string());
        self.claims = Some(claims);
        Ok(self.claims.as_ref().expect("recién asignado"))
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.claims = None;
    }

    pub fn current_user(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(InspeccionError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode("firma")
        )
    }

    #[test]
    fn test_decode_valid_token() {
        let token = make_token(r#"{"sub":"7","name":"Inspector Uno","exp":4102444800}"#);
        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.name.as_deref(), Some("Inspector Uno"));
        assert!(!claims.is_expired_at(4102444799));
        assert!(claims.is_expired_at(4102444801));
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert!(matches!(
            decode_token("solo.dos"),
            Err(InspeccionError::InvalidToken(_))
        ));
        assert!(matches!(
            decode_token("a.b.c.d"),
            Err(InspeccionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode_token("x.¡no-base64!.y"),
            Err(InspeccionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_json_payload() {
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode("no es json"));
        assert!(matches!(
            decode_token(&token),
            Err(InspeccionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        let token = make_token(r#"{"sub":"9"}"#);
        let claims = decode_token(&token).unwrap();
        assert!(!claims.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_session_login_logout() {
        let mut session = AuthSession::new();
        assert!(session.current_user().is_none());
        assert!(session.token().is_err());

        let token = make_token(r#"{"sub":"3","role":"admin"}"#);
        let claims = session.login(&token).unwrap();
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(session.token().unwrap(), token);

        session.logout();
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_session_rejects_bad_token() {
        let mut session = AuthSession::new();
        assert!(session.login("basura").is_err());
        assert!(session.current_user().is_none());
    }
}
