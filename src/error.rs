//! # Errores del Servidor
//! src/error.rs
//!
//! Tipos de error compartidos por los distintos módulos. Cada error queda
//! contenido en el worker que lo produce; solo `ServerError` llega a `main`.

use crate::http::StatusCode;
use std::io;
use std::path::PathBuf;

/// Errores de arranque y configuración
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuración inválida (workers en cero, prefijo mal formado, etc.)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No se pudo abrir el socket de escucha
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// No se pudo crear un thread del pool o el listener
    #[error("failed to spawn thread {name}: {source}")]
    SpawnThread {
        name: String,
        #[source]
        source: io::Error,
    },

    /// No se pudo abrir el archivo del access log
    #[error("failed to open access log {path}: {source}")]
    AccessLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errores al leer o parsear la request line
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// El peer cerró la conexión sin enviar nada
    #[error("connection closed before any data was received")]
    ConnectionClosed,

    /// La primera línea no contiene ningún token
    #[error("empty request line")]
    EmptyRequestLine,

    /// Se superó el máximo de bytes sin encontrar fin de línea
    #[error("request line exceeds {max} bytes")]
    LineTooLong { max: usize },

    #[error("failed to read request: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Indica si hay que responder al cliente o solo cerrar la conexión
    pub fn is_silent(&self) -> bool {
        matches!(self, ParseError::ConnectionClosed | ParseError::Io(_))
    }
}

/// Errores de una invocación CGI previos al streaming
#[derive(Debug, thiserror::Error)]
pub enum CgiError {
    #[error("script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// El path contiene segmentos `..`
    #[error("script path escapes the document root: {0}")]
    PathEscapesRoot(String),

    #[error("failed to spawn {}: {source}", .interpreter.display())]
    Spawn {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },

    /// El proceso hijo arrancó pero sin pipe de salida
    #[error("child process has no stdout pipe")]
    MissingStdout,
}

impl CgiError {
    /// Código de estado con el que se responde este error
    pub fn status(&self) -> StatusCode {
        match self {
            CgiError::ScriptNotFound(_) | CgiError::PathEscapesRoot(_) => StatusCode::NotFound,
            CgiError::Spawn { .. } | CgiError::MissingStdout => StatusCode::InternalServerError,
        }
    }
}
