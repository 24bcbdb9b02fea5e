//! # Pool Fijo de Workers
//! src/pool/worker.rs
//!
//! `N` threads que repiten: `pop` de la cola, procesar el elemento hasta el
//! final (incluida la espera del proceso CGI), volver a empezar. El pool
//! termina solo cuando la cola se cierra y se vacía.

use super::queue::TaskQueue;
use crate::error::ServerError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Pool de threads consumidores de una `TaskQueue`
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Arranca `size` workers llamados `worker-0`, `worker-1`, ...
    ///
    /// Cada worker ejecuta `handler` con cada elemento que desencola. Un
    /// panic dentro del handler se contiene en ese elemento: el worker
    /// lo registra y sigue atendiendo la cola.
    ///
    /// Si algún thread no se puede crear, la cola se cierra y se espera a
    /// los workers ya arrancados antes de retornar el error.
    pub fn spawn<T, F>(size: usize, queue: TaskQueue<T>, handler: F) -> Result<Self, ServerError>
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let mut handles = Vec::with_capacity(size);

        for i in 0..size {
            let name = format!("worker-{}", i);
            let worker_queue = queue.clone();
            let handler = Arc::clone(&handler);

            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || Self::worker_loop(worker_queue, handler));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    queue.close();
                    Self { handles }.join();
                    return Err(ServerError::SpawnThread { name, source });
                }
            }
        }

        Ok(Self { handles })
    }

    fn worker_loop<T, F>(queue: TaskQueue<T>, handler: Arc<F>)
    where
        F: Fn(T),
    {
        let name = current_worker_name();
        tracing::debug!(worker = %name, "worker started");

        while let Some(item) = queue.pop() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler(item)));
            if result.is_err() {
                tracing::error!(worker = %name, "handler panicked; item dropped");
            }
        }

        tracing::debug!(worker = %name, "worker stopped");
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Espera a que todos los workers terminen (requiere cerrar la cola)
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Nombre del thread actual, o su id si no tiene nombre
pub fn current_worker_name() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}
