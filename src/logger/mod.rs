//! # Logging
//!
//! Dos canales separados:
//!
//! - **Access log** (`access`): una línea por request completado, con su
//!   propio sink y su propio lock.
//! - **Diagnóstico**: eventos `tracing` (arranque, errores de accept,
//!   fallos de spawn, errores de I/O a mitad del streaming).

pub mod access;

pub use access::{AccessLog, LogFormat, LogRecord};

use tracing_subscriber::EnvFilter;

/// Instala el subscriber `fmt` de tracing
///
/// El nivel se toma de `RUST_LOG` (por defecto `info`). Si ya hay un
/// subscriber global instalado no hace nada.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init();
}
