//! # CGI Server
//! src/lib.rs
//!
//! Servidor TCP concurrente que despacha cada conexión a un pool fijo de
//! workers y, para los paths bajo el prefijo CGI, ejecuta un intérprete
//! externo reenviando su stdout al cliente.
//!
//! ## Arquitectura
//!
//! - `pool`: cola acotada de conexiones y workers que la consumen
//! - `http`: request line, respuestas fijas y códigos de estado
//! - `cgi`: resolución de scripts y ejecución de procesos hijos
//! - `logger`: access log y subscriber de `tracing`
//! - `metrics`: contadores del servidor
//! - `server`: listener, servicio por conexión y apagado ordenado
//! - `config`: argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use cgi_server::config::Config;
//! use cgi_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::new(config).expect("invalid configuration");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod cgi;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod pool;
pub mod server;

#[cfg(test)]
mod test_support;

pub use error::{CgiError, ParseError, ServerError};
