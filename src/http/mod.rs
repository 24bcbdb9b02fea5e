//! # Módulo HTTP
//!
//! Lo mínimo del protocolo que necesita el servidor:
//!
//! - Lectura y parsing de la request line (método, path, query)
//! - Respuestas fijas para el placeholder y los errores
//! - Códigos de estado para el log
//!
//! No se parsean headers ni body, y las respuestas CGI se reenvían tal
//! cual las escribe el proceso hijo.

pub mod request;
pub mod response;
pub mod status;

pub use request::{read_request_line, Request};
pub use response::Response;
pub use status::StatusCode;
