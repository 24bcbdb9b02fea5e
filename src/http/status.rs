//! # Códigos de Estado
//! src/http/status.rs
//!
//! Los únicos códigos que el servidor genera por sí mismo. Las respuestas
//! CGI traen su propia status line (si la traen) y no pasan por aquí; el
//! 200 que se registra para ellas solo indica que el hijo se ejecutó.

/// Códigos de estado que aparecen en respuestas sintetizadas y en el log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - Placeholder o CGI ejecutado
    Ok = 200,

    /// 400 Bad Request - Request line inválida o demasiado larga
    BadRequest = 400,

    /// 404 Not Found - Script inexistente
    NotFound = 404,

    /// 500 Internal Server Error - Falló la creación del proceso o del pipe
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_server::http::StatusCode;
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Texto de razón asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
