//! Record every degradation event: component, failure mode, fallback used, timestamp, recovery status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sift_core::clock::{Clock, SystemClock};
use sift_core::models::DegradationEvent;

/// Recovery status of a degradation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    /// Recovered to normal operation.
    Recovered,
}

/// A tracked degradation event with recovery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// Tracks degradation events for reporting.
#[derive(Debug, Clone)]
pub struct DegradationTracker {
    events: Vec<TrackedDegradation>,
    clock: Arc<dyn Clock>,
}

impl Default for DegradationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Vec::new(),
            clock,
        }
    }

    /// Record a new degradation event. While a degradation of the same
    /// component with the same fallback is active, repeats are not stored.
    /// Returns whether the event was stored.
    pub fn record(&mut self, event: DegradationEvent) -> bool {
        let duplicate = self.events.iter().any(|t| {
            t.recovery_status == RecoveryStatus::Active
                && t.event.component == event.component
                && t.event.fallback_used == event.fallback_used
        });
        if duplicate {
            return false;
        }
        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        self.events.push(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
        true
    }

    /// Mark every active degradation of a component as recovered.
    /// Returns how many were closed.
    pub fn mark_recovered(&mut self, component: &str) -> usize {
        let now = self.clock.now();
        let mut closed = 0;
        for tracked in self.events.iter_mut() {
            if tracked.event.component == component
                && tracked.recovery_status == RecoveryStatus::Active
            {
                tracked.recovery_status = RecoveryStatus::Recovered;
                tracked.recovered_at = Some(now);
                closed += 1;
            }
        }
        if closed > 0 {
            tracing::info!(component = %component, closed, "component recovered");
        }
        closed
    }

    pub fn events(&self) -> &[TrackedDegradation] {
        &self.events
    }

    /// Get active (unrecovered) degradations.
    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    /// Whether any degradation of `component` is still active.
    pub fn is_degraded(&self, component: &str) -> bool {
        self.events.iter().any(|t| {
            t.event.component == component && t.recovery_status == RecoveryStatus::Active
        })
    }

    /// Count events in the last N seconds for a given component.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let cutoff = self.clock.now() - chrono::Duration::seconds(window_secs);
        self.events
            .iter()
            .filter(|t| t.event.component == component && t.event.timestamp > cutoff)
            .count()
    }

    /// Count events in the last N seconds across all components.
    pub fn count_all_recent(&self, window_secs: i64) -> usize {
        let cutoff = self.clock.now() - chrono::Duration::seconds(window_secs);
        self.events
            .iter()
            .filter(|t| t.event.timestamp > cutoff)
            .count()
    }

    /// Duration a component has been continuously degraded, or None if not degraded.
    pub fn degraded_duration(&self, component: &str) -> Option<chrono::Duration> {
        let earliest = self
            .events
            .iter()
            .filter(|t| {
                t.event.component == component && t.recovery_status == RecoveryStatus::Active
            })
            .map(|t| t.event.timestamp)
            .min()?;
        Some(self.clock.now() - earliest)
    }

    /// Drop recovered events older than `window_secs`. Active events are kept.
    pub fn prune(&mut self, window_secs: i64) -> usize {
        let cutoff = self.clock.now() - chrono::Duration::seconds(window_secs);
        let before = self.events.len();
        self.events.retain(|t| {
            t.recovery_status == RecoveryStatus::Active || t.event.timestamp > cutoff
        });
        before - self.events.len()
    }
}
