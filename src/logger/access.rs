//! # Access Log
//! src/logger/access.rs
//!
//! Un registro por request completado. Todas las escrituras pasan por el
//! mismo mutex, así que las líneas de distintos workers nunca se mezclan;
//! el orden es el de finalización, no el de llegada.
//!
//! ```text
//! [2026-10-15 12:00:00] [worker-2] [GET] [/cgi-bin/hello.sh] [200]
//! ```

use crate::error::ServerError;
use crate::http::StatusCode;
use crate::pool::current_worker_name;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formato de cada línea del access log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// `[fecha] [worker] [método] [path] [status]`
    #[default]
    Text,
    /// Un objeto JSON por línea
    Json,
}

/// Registro de un request completado
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub worker: String,
    pub method: String,
    pub path: String,
    pub status: u16,
}

impl LogRecord {
    /// Crea un registro con la hora local y el nombre del thread actual
    pub fn now(method: &str, path: &str, status: StatusCode) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            worker: current_worker_name(),
            method: method.to_string(),
            path: path.to_string(),
            status: status.as_u16(),
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "[{}] [{}] [{}] [{}] [{}]",
            self.timestamp, self.worker, self.method, self.path, self.status
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_text())
    }
}

/// Sink compartido del access log
pub struct AccessLog {
    sink: Mutex<Box<dyn Write + Send>>,
    format: LogFormat,
}

impl AccessLog {
    pub fn with_sink(sink: Box<dyn Write + Send>, format: LogFormat) -> Self {
        Self {
            sink: Mutex::new(sink),
            format,
        }
    }

    pub fn stdout(format: LogFormat) -> Self {
        Self::with_sink(Box::new(io::stdout()), format)
    }

    /// Abre (o crea) un archivo en modo append
    pub fn open(path: &Path, format: LogFormat) -> Result<Self, ServerError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ServerError::AccessLog {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::with_sink(Box::new(file), format))
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Registra un request completado por el worker actual
    pub fn record(&self, method: &str, path: &str, status: StatusCode) {
        self.write_record(&LogRecord::now(method, path, status));
    }

    /// Escribe una línea completa con el lock tomado
    pub fn write_record(&self, record: &LogRecord) {
        let line = match self.format {
            LogFormat::Text => record.to_text(),
            LogFormat::Json => record.to_json(),
        };

        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let result = writeln!(sink, "{}", line).and_then(|_| sink.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write access log record");
        }
    }
}
