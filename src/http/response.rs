//! # Respuestas Fijas
//! src/http/response.rs
//!
//! El servidor no construye respuestas HTTP dinámicas: solo emite un puñado
//! de literales precalculados. Cada uno se escribe al socket con una sola
//! llamada, sin chunking ni cálculo de `Content-Length`.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! <html><body><h1>404 Not Found</h1></body></html>
//! ```

use super::StatusCode;
use std::io::{self, Write};

const PLACEHOLDER: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\
\r\n\
Not a CGI request.";

const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><h1>400 Bad Request</h1></body></html>";

const NOT_FOUND: &[u8] = b"HTTP/1.1 404 Not Found\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><h1>404 Not Found</h1></body></html>";

const INTERNAL_ERROR: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><h1>500 Internal Server Error</h1></body></html>";

/// Respuesta sintetizada por el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Cualquier path fuera del prefijo CGI
    Placeholder,
    BadRequest,
    NotFound,
    InternalError,
}

impl Response {
    /// Respuesta de error correspondiente a un código de estado
    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::Ok => Response::Placeholder,
            StatusCode::BadRequest => Response::BadRequest,
            StatusCode::NotFound => Response::NotFound,
            StatusCode::InternalServerError => Response::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Response::Placeholder => StatusCode::Ok,
            Response::BadRequest => StatusCode::BadRequest,
            Response::NotFound => StatusCode::NotFound,
            Response::InternalError => StatusCode::InternalServerError,
        }
    }

    /// Bytes exactos que se envían al cliente
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Response::Placeholder => PLACEHOLDER,
            Response::BadRequest => BAD_REQUEST,
            Response::NotFound => NOT_FOUND,
            Response::InternalError => INTERNAL_ERROR,
        }
    }

    /// Escribe la respuesta completa en `out`
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_server::http::Response;
    ///
    /// let mut out = Vec::new();
    /// Response::NotFound.write_to(&mut out).unwrap();
    /// assert!(String::from_utf8_lossy(&out).contains("404 Not Found"));
    /// ```
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_body() {
        let text = String::from_utf8(Response::Placeholder.as_bytes().to_vec()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.ends_with("\r\n\r\nNot a CGI request."));
    }

    #[test]
    fn test_error_bodies() {
        let not_found = String::from_utf8_lossy(Response::NotFound.as_bytes()).to_string();
        assert!(not_found.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(not_found.contains("<h1>404 Not Found</h1>"));

        let internal = String::from_utf8_lossy(Response::InternalError.as_bytes()).to_string();
        assert!(internal.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(internal.contains("<h1>500 Internal Server Error</h1>"));
    }

    #[test]
    fn test_status_mapping() {
        for status in [
            StatusCode::Ok,
            StatusCode::BadRequest,
            StatusCode::NotFound,
            StatusCode::InternalServerError,
        ] {
            assert_eq!(Response::for_status(status).status(), status);
        }
    }

    #[test]
    fn test_write_to() {
        let mut out = Vec::new();
        Response::BadRequest.write_to(&mut out).unwrap();
        assert_eq!(out, Response::BadRequest.as_bytes());
    }
}
