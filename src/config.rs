//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./cgi_server --port 8080 \
//!   --workers 4 \
//!   --queue-capacity 16 \
//!   --document-root /srv/www \
//!   --interpreter /bin/bash
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! CGI_PORT=8080 CGI_DOCUMENT_ROOT=/srv/www ./cgi_server
//! ```

use crate::cgi::CgiConfig;
use crate::error::ServerError;
use crate::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[cfg(windows)]
const DEFAULT_INTERPRETER: &str = "bash.exe";
#[cfg(not(windows))]
const DEFAULT_INTERPRETER: &str = "/bin/sh";

/// Largo mínimo aceptado para `--max-request-line`
const MIN_REQUEST_LINE: usize = 16;

/// Configuración del servidor CGI
#[derive(Debug, Clone, Parser)]
#[command(name = "cgi_server")]
#[command(about = "Servidor TCP concurrente con pool de workers y ejecución CGI")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Host/IP (IPv4) en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "CGI_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "CGI_PORT")]
    pub port: u16,

    // === Concurrencia ===

    /// Número de workers del pool
    #[arg(short, long, default_value = "4", env = "CGI_WORKERS")]
    pub workers: usize,

    /// Capacidad de la cola de conexiones aceptadas
    #[arg(long = "queue-capacity", default_value = "16", env = "CGI_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === CGI ===

    /// Prefijo de path que se ejecuta como CGI
    #[arg(long = "cgi-prefix", default_value = "/cgi-bin/", env = "CGI_PREFIX")]
    pub cgi_prefix: String,

    /// Directorio raíz al que se concatena el path del request
    #[arg(long = "document-root", default_value = ".", env = "CGI_DOCUMENT_ROOT")]
    pub document_root: PathBuf,

    /// Intérprete que ejecuta los scripts
    #[arg(long, default_value = DEFAULT_INTERPRETER, env = "CGI_INTERPRETER")]
    pub interpreter: PathBuf,

    // === Requests ===

    /// Máximo de bytes de la request line
    #[arg(long = "max-request-line", default_value = "2048", env = "CGI_MAX_REQUEST_LINE")]
    pub max_request_line: usize,

    // === Logging ===

    /// Formato del access log
    #[arg(long = "log-format", value_enum, default_value = "text", env = "CGI_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Archivo del access log (stdout si no se indica)
    #[arg(long = "access-log", env = "CGI_ACCESS_LOG")]
    pub access_log: Option<PathBuf>,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use cgi_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parte de la configuración que usa el ejecutor CGI
    pub fn cgi(&self) -> CgiConfig {
        CgiConfig {
            prefix: self.cgi_prefix.clone(),
            document_root: self.document_root.clone(),
            interpreter: self.interpreter.clone(),
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.workers == 0 {
            return Err(ServerError::Config("workers must be >= 1".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(ServerError::Config("queue capacity must be >= 1".to_string()));
        }
        if self.max_request_line < MIN_REQUEST_LINE {
            return Err(ServerError::Config(format!(
                "max request line must be >= {} bytes",
                MIN_REQUEST_LINE
            )));
        }
        if !self.cgi_prefix.starts_with('/') {
            return Err(ServerError::Config("CGI prefix must start with '/'".to_string()));
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║                CGI Server Configuration                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:        {}", self.address());
        println!("   Max req line:   {} bytes", self.max_request_line);
        println!();
        println!("👷 Worker Pool:");
        println!("   Workers:        {}", self.workers);
        println!("   Queue capacity: {}", self.queue_capacity);
        println!();
        println!("⚙️  CGI:");
        println!("   Prefix:         {}", self.cgi_prefix);
        println!("   Document root:  {}", self.document_root.display());
        println!("   Interpreter:    {}", self.interpreter.display());
        println!();
        println!("📝 Access log:");
        match &self.access_log {
            Some(path) => println!("   Output:         {}", path.display()),
            None => println!("   Output:         stdout"),
        }
        println!("   Format:         {:?}", self.log_format);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: 4,
            queue_capacity: 16,
            cgi_prefix: "/cgi-bin/".to_string(),
            document_root: PathBuf::from("."),
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            max_request_line: 2048,
            log_format: LogFormat::Text,
            access_log: None,
        }
    }
}
