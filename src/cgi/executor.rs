//! # Ejecutor CGI
//! src/cgi/executor.rs
//!
//! Ciclo de vida de un proceso CGI:
//!
//! 1. Resolver el script (404 si no existe, sin lanzar nada)
//! 2. Lanzar `interpreter script_path` con su propio entorno y stdout en un pipe
//! 3. Reenviar al cliente cada byte del pipe hasta EOF
//! 4. Esperar a que el hijo termine
//!
//! stdin y stderr del hijo quedan conectados a los del servidor. El extremo
//! de escritura del pipe solo existe en el hijo, así que el EOF llega en
//! cuanto el hijo cierra stdout o termina.
//!
//! Una vez que empezó el streaming no hay segunda respuesta posible: si el
//! socket o el pipe fallan a mitad, se corta el reenvío, se libera todo y
//! el request se registra igual con 200.

use super::invocation::{CgiConfig, CgiInvocation};
use crate::error::CgiError;
use crate::http::{Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};

const PIPE_CHUNK: usize = 4096;

/// Resultado de una ejecución, para el log y las métricas
#[derive(Debug)]
pub struct CgiOutcome {
    pub status: StatusCode,
    pub bytes_forwarded: u64,
    /// `None` si el hijo no llegó a lanzarse o no se pudo esperar
    pub exit_status: Option<ExitStatus>,
}

impl CgiOutcome {
    fn failed(status: StatusCode) -> Self {
        Self {
            status,
            bytes_forwarded: 0,
            exit_status: None,
        }
    }
}

/// Ejecuta scripts CGI y reenvía su salida
#[derive(Clone)]
pub struct CgiExecutor {
    config: CgiConfig,
    metrics: MetricsCollector,
}

impl CgiExecutor {
    pub fn new(config: CgiConfig, metrics: MetricsCollector) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &CgiConfig {
        &self.config
    }

    /// Ejecuta el script del request escribiendo la respuesta en `out`
    ///
    /// Los errores previos al spawn se responden con el cuerpo 404/500
    /// correspondiente; el código resultante queda en `CgiOutcome::status`.
    pub fn execute<W: Write + ?Sized>(&self, out: &mut W, request: &Request) -> CgiOutcome {
        let invocation = match CgiInvocation::prepare(&self.config, request) {
            Ok(invocation) => invocation,
            Err(e) => return self.reject(out, e),
        };

        let mut child = match self.spawn(&invocation) {
            Ok(child) => child,
            Err(e) => {
                self.metrics.record_cgi_spawn_failure();
                return self.reject(out, e);
            }
        };
        self.metrics.record_cgi_spawn();

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return self.reject(out, CgiError::MissingStdout);
        };

        let (bytes_forwarded, stream_error) = forward(stdout, out);
        self.metrics.record_bytes_forwarded(bytes_forwarded);

        if let Some(e) = stream_error {
            tracing::warn!(
                script = %invocation.script_path.display(),
                bytes_forwarded,
                error = %e,
                "CGI output stream interrupted"
            );
        }

        let exit_status = match child.wait() {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(error = %e, "failed to wait for CGI process");
                None
            }
        };

        tracing::debug!(
            script = %invocation.script_path.display(),
            bytes_forwarded,
            exit = ?exit_status,
            "CGI process finished"
        );

        CgiOutcome {
            status: StatusCode::Ok,
            bytes_forwarded,
            exit_status,
        }
    }

    fn spawn(&self, invocation: &CgiInvocation) -> Result<Child, CgiError> {
        Command::new(&self.config.interpreter)
            .arg(&invocation.script_path)
            .envs(invocation.env_vars())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CgiError::Spawn {
                interpreter: self.config.interpreter.clone(),
                source,
            })
    }

    fn reject<W: Write + ?Sized>(&self, out: &mut W, error: CgiError) -> CgiOutcome {
        let status = error.status();
        match status {
            StatusCode::NotFound => tracing::debug!(error = %error, "CGI request rejected"),
            _ => tracing::error!(error = %error, "CGI request failed"),
        }

        if let Err(e) = Response::for_status(status).write_to(out) {
            tracing::debug!(error = %e, "failed to send error response");
        }
        CgiOutcome::failed(status)
    }
}

/// Copia `reader` en `out` por chunks hasta EOF
///
/// Retorna los bytes escritos y el error que cortó la copia, si hubo. El
/// reader se consume y se cierra al salir.
fn forward<R: Read, W: Write + ?Sized>(mut reader: R, out: &mut W) -> (u64, Option<io::Error>) {
    let mut chunk = [0u8; PIPE_CHUNK];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (total, Some(e)),
        };

        if let Err(e) = out.write_all(&chunk[..n]) {
            return (total, Some(e));
        }
        total += n as u64;
    }

    match out.flush() {
        Ok(()) => (total, None),
        Err(e) => (total, Some(e)),
    }
}
