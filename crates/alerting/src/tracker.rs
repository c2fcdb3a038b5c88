//! Acknowledgment and Escalation State

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Tracking state of one message id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationStatus {
    /// When the last dispatch of this id completed
    pub sent_at: Option<DateTime<Utc>>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    /// Escalation broadcast has been committed
    pub escalated: bool,
    /// Escalation checks scheduled and not yet fired
    pub scheduled_checks: u32,
}

/// Result of an acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// First acknowledgment, escalation (if pending) is suppressed
    Acknowledged,
    /// Already acknowledged earlier
    AlreadyAcknowledged,
    /// Escalation was committed before this acknowledgment
    TooLate,
    /// Id was never dispatched, recorded anyway
    Unknown,
}

/// Decision taken when an escalation timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscalationDecision {
    Escalate,
    Suppressed,
    AlreadyEscalated,
}

/// Per-message state shared by dispatch, acknowledgment and timers
#[derive(Debug, Default)]
pub(crate) struct EscalationTracker {
    states: Mutex<HashMap<String, EscalationStatus>>,
}

impl EscalationTracker {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, EscalationStatus>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make an id known before its sends go out
    pub fn begin_dispatch(&self, message_id: &str) {
        self.lock().entry(message_id.to_string()).or_default();
    }

    /// Record a completed dispatch without touching acknowledgment state
    pub fn record_sent(&self, message_id: &str, at: DateTime<Utc>, check_scheduled: bool) {
        let mut states = self.lock();
        let state = states.entry(message_id.to_string()).or_default();
        state.sent_at = Some(at);
        if check_scheduled {
            state.scheduled_checks += 1;
        }
    }

    pub fn acknowledge(&self, message_id: &str, contact_name: &str) -> AckOutcome {
        let mut states = self.lock();
        let known = states.contains_key(message_id);
        let state = states.entry(message_id.to_string()).or_default();

        let outcome = if state.escalated {
            AckOutcome::TooLate
        } else if state.acknowledged {
            AckOutcome::AlreadyAcknowledged
        } else if known {
            AckOutcome::Acknowledged
        } else {
            AckOutcome::Unknown
        };

        if !state.acknowledged {
            state.acknowledged = true;
            state.acknowledged_by = Some(contact_name.to_string());
        }
        outcome
    }

    /// Check-and-set taken when the timer fires
    ///
    /// Reads the acknowledged flag and marks the id escalated under one lock,
    /// so at most one caller ever receives `Escalate` per id.
    pub fn try_commit_escalation(&self, message_id: &str) -> EscalationDecision {
        let mut states = self.lock();
        let state = states.entry(message_id.to_string()).or_default();
        state.scheduled_checks = state.scheduled_checks.saturating_sub(1);

        if state.escalated {
            EscalationDecision::AlreadyEscalated
        } else if state.acknowledged {
            EscalationDecision::Suppressed
        } else {
            state.escalated = true;
            EscalationDecision::Escalate
        }
    }

    pub fn status(&self, message_id: &str) -> Option<EscalationStatus> {
        self.lock().get(message_id).cloned()
    }

    /// Dispatched ids with neither acknowledgment nor escalation
    pub fn pending(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(_, s)| s.sent_at.is_some() && !s.acknowledged && !s.escalated)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Drop entries sent at or before `cutoff` that have no check left to fire
    ///
    /// In-flight dispatches and acknowledgments for never-sent ids are kept.
    pub fn prune(&self, cutoff: DateTime<Utc>) -> usize {
        let mut states = self.lock();
        let before = states.len();
        states.retain(|_, s| s.scheduled_checks > 0 || s.sent_at.map_or(true, |at| at > cutoff));
        before - states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_ack_before_timer_suppresses() {
        let tracker = EscalationTracker::default();
        tracker.record_sent("m1", Utc::now(), true);

        assert_eq!(tracker.acknowledge("m1", "Fire Chief"), AckOutcome::Acknowledged);
        assert_eq!(tracker.acknowledge("m1", "Maintenance"), AckOutcome::AlreadyAcknowledged);
        assert_eq!(tracker.try_commit_escalation("m1"), EscalationDecision::Suppressed);

        let status = tracker.status("m1").unwrap();
        assert_eq!(status.acknowledged_by.as_deref(), Some("Fire Chief"));
        assert!(!status.escalated);
    }

    #[test]
    fn test_ack_after_commit_is_too_late() {
        let tracker = EscalationTracker::default();
        tracker.record_sent("m1", Utc::now(), true);

        assert_eq!(tracker.try_commit_escalation("m1"), EscalationDecision::Escalate);
        assert_eq!(tracker.acknowledge("m1", "Fire Chief"), AckOutcome::TooLate);
        assert_eq!(tracker.try_commit_escalation("m1"), EscalationDecision::AlreadyEscalated);
    }

    #[test]
    fn test_unknown_ack_is_recorded() {
        let tracker = EscalationTracker::default();
        assert_eq!(tracker.acknowledge("ghost", "Fire Chief"), AckOutcome::Unknown);

        // A later dispatch keeps the acknowledgment
        tracker.record_sent("ghost", Utc::now(), true);
        assert!(tracker.status("ghost").unwrap().acknowledged);
        assert_eq!(tracker.try_commit_escalation("ghost"), EscalationDecision::Suppressed);
    }

    #[test]
    fn test_ack_while_sends_in_flight() {
        let tracker = EscalationTracker::default();
        tracker.begin_dispatch("m1");

        assert_eq!(tracker.acknowledge("m1", "Fire Chief"), AckOutcome::Acknowledged);
        tracker.record_sent("m1", Utc::now(), true);

        let status = tracker.status("m1").unwrap();
        assert!(status.acknowledged);
        assert!(status.sent_at.is_some());
        assert_eq!(tracker.try_commit_escalation("m1"), EscalationDecision::Suppressed);
    }

    #[test]
    fn test_prune_keeps_scheduled_and_recent() {
        let tracker = EscalationTracker::default();
        let long_ago = Utc::now() - chrono::Duration::hours(2);
        tracker.record_sent("old-info", long_ago, false);
        tracker.record_sent("old-acked", long_ago, true);
        tracker.acknowledge("old-acked", "Fire Chief");
        tracker.record_sent("old-waiting", long_ago, true);
        tracker.record_sent("fresh", Utc::now(), false);
        tracker.begin_dispatch("in-flight");

        // old-acked still has its timer outstanding
        let cutoff = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(tracker.prune(cutoff), 1);
        assert!(tracker.status("old-info").is_none());
        assert!(tracker.status("old-acked").is_some());

        assert_eq!(tracker.try_commit_escalation("old-acked"), EscalationDecision::Suppressed);
        assert_eq!(tracker.try_commit_escalation("old-waiting"), EscalationDecision::Escalate);
        assert_eq!(tracker.prune(cutoff), 2);
        assert!(tracker.status("fresh").is_some());
        assert!(tracker.status("in-flight").is_some());
    }

    #[test]
    fn test_pending() {
        let tracker = EscalationTracker::default();
        tracker.record_sent("a", Utc::now(), false);
        tracker.record_sent("b", Utc::now(), false);
        tracker.record_sent("c", Utc::now(), true);
        tracker.acknowledge("b", "x");
        tracker.try_commit_escalation("c");

        assert_eq!(tracker.pending(), vec!["a".to_string()]);
    }

    #[test]
    fn test_concurrent_commit_and_ack_escalate_at_most_once() {
        for _ in 0..50 {
            let tracker = Arc::new(EscalationTracker::default());
            tracker.record_sent("m", Utc::now(), true);

            let threads = 8;
            let barrier = Arc::new(Barrier::new(threads * 2));
            let escalations = Arc::new(AtomicUsize::new(0));
            let accepted_acks = Arc::new(AtomicUsize::new(0));

            let mut handles = Vec::new();
            for _ in 0..threads {
                let (timer_tracker, timer_barrier, escalations) =
                    (Arc::clone(&tracker), Arc::clone(&barrier), Arc::clone(&escalations));
                handles.push(std::thread::spawn(move || {
                    timer_barrier.wait();
                    if timer_tracker.try_commit_escalation("m") == EscalationDecision::Escalate {
                        escalations.fetch_add(1, Ordering::SeqCst);
                    }
                }));

                let (ack_tracker, ack_barrier, accepted_acks) =
                    (Arc::clone(&tracker), Arc::clone(&barrier), Arc::clone(&accepted_acks));
                handles.push(std::thread::spawn(move || {
                    ack_barrier.wait();
                    if ack_tracker.acknowledge("m", "responder") == AckOutcome::Acknowledged {
                        accepted_acks.fetch_add(1, Ordering::SeqCst);
                    }
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }

            let escalated = escalations.load(Ordering::SeqCst);
            let acked = accepted_acks.load(Ordering::SeqCst);
            assert!(escalated <= 1);
            // Exactly one side wins the race
            assert_eq!(escalated + acked, 1);
        }
    }
}
