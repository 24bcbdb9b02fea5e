//! # Servidor TCP con Pool de Workers
//! src/server/tcp.rs
//!
//! Un thread `listener` acepta conexiones y las encola; `N` workers las
//! desencolan y procesan de principio a fin. Cuando la cola está llena el
//! `push` bloquea al listener, y con él al `accept`: es el único control
//! de admisión del servidor.
//!
//! ```text
//! listener --push--> TaskQueue<TcpStream> --pop--> worker-N
//!                                                    |
//!                                 request line ------+
//!                                   |            |
//!                              placeholder     CGI executor
//!                                   |            |
//!                                   +-- access log --> close
//! ```

use crate::cgi::CgiExecutor;
use crate::config::Config;
use crate::error::{ParseError, ServerError};
use crate::http::{Request, Response, StatusCode};
use crate::logger::AccessLog;
use crate::metrics::MetricsCollector;
use crate::pool::{TaskQueue, WorkerPool};
use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Estado compartido por todos los workers
///
/// Se construye una vez al arrancar y se pasa por `Arc` a cada worker.
pub struct Service {
    cgi: CgiExecutor,
    access_log: AccessLog,
    metrics: MetricsCollector,
    max_request_line: usize,
}

impl Service {
    pub fn new(config: &Config, access_log: AccessLog, metrics: MetricsCollector) -> Self {
        Self {
            cgi: CgiExecutor::new(config.cgi(), metrics.clone()),
            access_log,
            metrics,
            max_request_line: config.max_request_line,
        }
    }

    /// Procesa una conexión completa y la cierra
    ///
    /// Toma ownership del stream: al retornar (por cualquier camino) la
    /// conexión se cierra exactamente una vez.
    pub fn handle<S: Read + Write>(&self, mut stream: S) {
        let start = Instant::now();
        self.metrics.worker_busy();

        if let Some(status) = self.serve(&mut stream) {
            self.metrics.record_request(status.as_u16(), start.elapsed());
        }

        self.metrics.worker_idle();
    }

    /// Retorna el código registrado, o `None` si no hubo request
    fn serve<S: Read + Write>(&self, stream: &mut S) -> Option<StatusCode> {
        let request = match Request::read_from(stream, self.max_request_line) {
            Ok(request) => request,
            Err(e) if e.is_silent() => {
                tracing::debug!(error = %e, "connection dropped before request line");
                return None;
            }
            Err(e) => return Some(self.reject(stream, e)),
        };

        let status = if self.cgi.config().matches(request.path()) {
            self.cgi.execute(stream, &request).status
        } else {
            if let Err(e) = Response::Placeholder.write_to(stream) {
                tracing::debug!(error = %e, "failed to send placeholder response");
            }
            StatusCode::Ok
        };

        self.access_log.record(request.method(), request.path(), status);
        Some(status)
    }

    fn reject<S: Write>(&self, stream: &mut S, error: ParseError) -> StatusCode {
        tracing::debug!(error = %error, "malformed request line");
        if let Err(e) = Response::BadRequest.write_to(stream) {
            tracing::debug!(error = %e, "failed to send 400 response");
        }
        self.access_log.record("-", "-", StatusCode::BadRequest);
        StatusCode::BadRequest
    }
}

/// Servidor configurado, todavía sin sockets ni threads
pub struct Server {
    config: Config,
    access_log: AccessLog,
    metrics: MetricsCollector,
}

impl Server {
    /// Valida la configuración y abre el access log configurado
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate()?;
        let access_log = match &config.access_log {
            Some(path) => AccessLog::open(path, config.log_format)?,
            None => AccessLog::stdout(config.log_format),
        };
        Self::with_access_log(config, access_log)
    }

    /// Igual que `new` pero con un sink de access log arbitrario
    pub fn with_access_log(config: Config, access_log: AccessLog) -> Result<Self, ServerError> {
        config.validate()?;
        Ok(Self {
            config,
            access_log,
            metrics: MetricsCollector::new(),
        })
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    /// Hace bind, arranca workers y listener, y retorna sin bloquear
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        let queue: TaskQueue<TcpStream> = TaskQueue::new(self.config.queue_capacity);
        let service = Arc::new(Service::new(&self.config, self.access_log, self.metrics.clone()));

        let pool = {
            let service = Arc::clone(&service);
            WorkerPool::spawn(self.config.workers, queue.clone(), move |stream: TcpStream| service.handle(stream))?
        };

        let trigger = ShutdownTrigger {
            stop: Arc::new(AtomicBool::new(false)),
            wake_addr: wake_address(local_addr),
            queue: queue.clone(),
        };

        let accept_loop = {
            let stop = Arc::clone(&trigger.stop);
            let metrics = self.metrics.clone();
            thread::Builder::new()
                .name("listener".to_string())
                .spawn(move || listen_loop(listener, queue, stop, metrics))
        };
        let accept_loop = match accept_loop {
            Ok(handle) => handle,
            Err(source) => {
                trigger.queue.close();
                pool.join();
                return Err(ServerError::SpawnThread {
                    name: "listener".to_string(),
                    source,
                });
            }
        };

        tracing::info!(
            address = %local_addr,
            workers = self.config.workers,
            queue_capacity = self.config.queue_capacity,
            "server listening"
        );

        Ok(ServerHandle {
            local_addr,
            trigger,
            listener: Some(accept_loop),
            pool: Some(pool),
            metrics: self.metrics,
        })
    }

    /// Arranca y bloquea hasta que se dispare el apagado
    pub fn run(self) -> Result<(), ServerError> {
        self.start()?.join();
        Ok(())
    }
}

fn listen_loop(listener: TcpListener, queue: TaskQueue<TcpStream>, stop: Arc<AtomicBool>, metrics: MetricsCollector) {
    for incoming in listener.incoming() {
        if stop.load(Ordering::SeqCst) {
            break;
        }

        match incoming {
            Ok(stream) => {
                metrics.record_accept();
                if queue.push(stream).is_err() {
                    // Cola cerrada: la conexión se cierra sin respuesta
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
    tracing::debug!("listener stopped");
}

/// Dirección a la que conectarse para despertar un `accept` bloqueado
fn wake_address(local_addr: SocketAddr) -> SocketAddr {
    if local_addr.ip().is_unspecified() {
        SocketAddr::from((Ipv4Addr::LOCALHOST, local_addr.port()))
    } else {
        local_addr
    }
}

/// Dispara el apagado ordenado desde cualquier thread
#[derive(Clone)]
pub struct ShutdownTrigger {
    stop: Arc<AtomicBool>,
    wake_addr: SocketAddr,
    queue: TaskQueue<TcpStream>,
}

impl ShutdownTrigger {
    /// Detiene el listener y cierra la cola
    ///
    /// Los workers terminan las conexiones ya encoladas antes de salir.
    /// Llamadas repetidas no hacen nada.
    pub fn trigger(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, WAKE_TIMEOUT) {
            tracing::debug!(error = %e, "failed to wake listener");
        }
        self.queue.close();
    }
}

/// Servidor en ejecución
pub struct ServerHandle {
    local_addr: SocketAddr,
    trigger: ShutdownTrigger,
    listener: Option<JoinHandle<()>>,
    pool: Option<WorkerPool>,
    metrics: MetricsCollector,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Dispara el apagado y espera a todos los threads
    pub fn shutdown(mut self) {
        self.trigger.trigger();
        self.join_threads();
    }

    /// Espera a que el servidor termine (otro thread debe disparar el apagado)
    pub fn join(mut self) {
        self.join_threads();
    }

    fn join_threads(&mut self) {
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
        // El listener pudo salir sin cerrar la cola
        self.trigger.queue.close();
        if let Some(pool) = self.pool.take() {
            pool.join();
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if self.listener.is_some() || self.pool.is_some() {
            self.trigger.trigger();
            self.join_threads();
        }
    }
}
