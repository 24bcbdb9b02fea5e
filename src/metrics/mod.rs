//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Contadores del servidor:
//! - Conexiones aceptadas y requests completados por código
//! - Procesos CGI lanzados, fallos de spawn y bytes reenviados
//! - Workers ocupados
//! - Latencias (p50, p95, p99)

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
