//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Listener TCP, pool de workers y procesamiento de cada conexión:
//! 1. El listener acepta y encola la conexión
//! 2. Un worker la desencola y lee la request line
//! 3. Responde con el placeholder o ejecuta el script CGI
//! 4. Registra el request en el access log y cierra

pub mod tcp;

pub use tcp::{Server, ServerHandle, Service, ShutdownTrigger};
