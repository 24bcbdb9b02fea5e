//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Contadores compartidos por el listener y los workers. Todo vive detrás
//! de un único mutex; las actualizaciones son O(1) salvo el cálculo de
//! percentiles, que solo ocurre al pedir un snapshot.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Máximo de latencias guardadas para los percentiles
const MAX_LATENCIES: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

#[derive(Default)]
struct MetricsData {
    connections_accepted: u64,
    total_requests: u64,
    status_codes: BTreeMap<u16, u64>,

    /// Latencias en microsegundos (ventana de las últimas MAX_LATENCIES)
    latencies: VecDeque<u64>,

    cgi_spawned: u64,
    cgi_spawn_failures: u64,
    cgi_bytes_forwarded: u64,

    /// Workers procesando una conexión en este momento
    busy_workers: u64,
}

/// Snapshot serializable de las métricas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub connections_accepted: u64,
    pub total_requests: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub cgi_spawned: u64,
    pub cgi_spawn_failures: u64,
    pub cgi_bytes_forwarded: u64,
    pub busy_workers: u64,
    pub latency_p50_us: u64,
    pub latency_p95_us: u64,
    pub latency_p99_us: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_accept(&self) {
        self.lock().connections_accepted += 1;
    }

    /// Registra un request completado
    pub fn record_request(&self, status_code: u16, latency: Duration) {
        let mut data = self.lock();
        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;

        if data.latencies.len() >= MAX_LATENCIES {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency.as_micros() as u64);
    }

    pub fn record_cgi_spawn(&self) {
        self.lock().cgi_spawned += 1;
    }

    pub fn record_cgi_spawn_failure(&self) {
        self.lock().cgi_spawn_failures += 1;
    }

    pub fn record_bytes_forwarded(&self, bytes: u64) {
        self.lock().cgi_bytes_forwarded += bytes;
    }

    pub fn worker_busy(&self) {
        self.lock().busy_workers += 1;
    }

    pub fn worker_idle(&self) {
        let mut data = self.lock();
        data.busy_workers = data.busy_workers.saturating_sub(1);
    }

    /// Obtiene un snapshot de las métricas actuales
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.lock();
        let (p50, p95, p99) = percentiles(&data.latencies);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            connections_accepted: data.connections_accepted,
            total_requests: data.total_requests,
            status_codes: data.status_codes.clone(),
            cgi_spawned: data.cgi_spawned,
            cgi_spawn_failures: data.cgi_spawn_failures,
            cgi_bytes_forwarded: data.cgi_bytes_forwarded,
            busy_workers: data.busy_workers,
            latency_p50_us: p50,
            latency_p95_us: p95,
            latency_p99_us: p99,
        }
    }

    /// Snapshot en JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn percentiles(latencies: &VecDeque<u64>) -> (u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted: Vec<u64> = latencies.iter().copied().collect();
    sorted.sort_unstable();

    let len = sorted.len();
    (sorted[len * 50 / 100], sorted[len * 95 / 100], sorted[len * 99 / 100])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_requests_by_status() {
        let collector = MetricsCollector::new();

        collector.record_request(200, Duration::from_millis(10));
        collector.record_request(200, Duration::from_millis(20));
        collector.record_request(404, Duration::from_millis(5));
        collector.record_request(500, Duration::from_millis(15));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.total_requests, 4);
        assert_eq!(snapshot.status_codes.get(&200), Some(&2));
        assert_eq!(snapshot.status_codes.get(&404), Some(&1));
        assert_eq!(snapshot.status_codes.get(&500), Some(&1));
    }

    #[test]
    fn test_percentiles() {
        let collector = MetricsCollector::new();
        for i in 1..=100 {
            collector.record_request(200, Duration::from_micros(i));
        }

        let snapshot = collector.snapshot();
        assert!(snapshot.latency_p50_us > 0);
        assert!(snapshot.latency_p95_us > snapshot.latency_p50_us);
        assert!(snapshot.latency_p99_us > snapshot.latency_p95_us);
    }

    #[test]
    fn test_latency_window() {
        let collector = MetricsCollector::new();
        for i in 0..(MAX_LATENCIES as u64 + 500) {
            collector.record_request(200, Duration::from_micros(i));
        }

        assert_eq!(collector.lock().latencies.len(), MAX_LATENCIES);
        assert_eq!(collector.snapshot().total_requests, MAX_LATENCIES as u64 + 500);
    }

    #[test]
    fn test_cgi_counters() {
        let collector = MetricsCollector::new();
        collector.record_cgi_spawn();
        collector.record_cgi_spawn();
        collector.record_cgi_spawn_failure();
        collector.record_bytes_forwarded(5);
        collector.record_bytes_forwarded(7);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.cgi_spawned, 2);
        assert_eq!(snapshot.cgi_spawn_failures, 1);
        assert_eq!(snapshot.cgi_bytes_forwarded, 12);
    }

    #[test]
    fn test_busy_workers_never_negative() {
        let collector = MetricsCollector::new();
        collector.worker_busy();
        collector.worker_idle();
        collector.worker_idle();
        assert_eq!(collector.snapshot().busy_workers, 0);
    }

    #[test]
    fn test_json_format() {
        let collector = MetricsCollector::new();
        collector.record_accept();
        collector.record_request(404, Duration::from_millis(1));

        let json: serde_json::Value = serde_json::from_str(&collector.to_json()).unwrap();
        assert_eq!(json["connections_accepted"], 1);
        assert_eq!(json["status_codes"]["404"], 1);
    }
}
