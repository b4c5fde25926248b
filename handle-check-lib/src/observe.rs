//! Observability hook called by the checker after every probe.

use crate::types::Availability;
use std::time::Duration;

/// What happened during one probe. Contains no credentials.
#[derive(Debug, Clone, Copy)]
pub struct ProbeRecord<'a> {
    pub platform: &'a str,
    pub candidate: &'a str,
    pub availability: Availability,
    /// Last HTTP status seen, if the probe used HTTP
    pub status: Option<u16>,
    pub latency: Duration,
}

/// Receives one record per completed probe.
///
/// Called after the verdict is final; nothing an observer does can change it.
pub trait ProbeObserver: Send + Sync {
    fn on_probe(&self, record: &ProbeRecord<'_>);
}

/// Default observer: one `tracing` event per probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProbeObserver for TracingObserver {
    fn on_probe(&self, record: &ProbeRecord<'_>) {
        let latency_ms = record.latency.as_millis() as u64;
        match record.availability {
            Availability::Error { code } => tracing::warn!(
                platform = record.platform,
                candidate = record.candidate,
                error = %code,
                status = record.status,
                latency_ms,
                "probe failed"
            ),
            availability => tracing::info!(
                platform = record.platform,
                candidate = record.candidate,
                available = availability.available(),
                status = record.status,
                latency_ms,
                "probe completed"
            ),
        }
    }
}

/// Observer that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProbeObserver for NoopObserver {
    fn on_probe(&self, _record: &ProbeRecord<'_>) {}
}
