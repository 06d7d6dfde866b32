//! Post-commit side effects: audit records, notifications, and broadcasts.
//!
//! Effects are collected while a transition runs and dispatched only after
//! its transaction commits. Dispatch is best-effort: a failing sink is
//! logged and dropped, and never rolls back or re-fails the committed
//! transition.

use serde_json::Value;

/// A boxed sink error; sinks are external collaborators with their own
/// failure modes.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// One queued side effect, produced by a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// A general audit-log record.
    Audit {
        /// The actor who drove the change.
        actor_id: i64,
        /// The action name, e.g. `"reservation.approve"`.
        action: &'static str,
        /// The entity type acted on.
        entity: &'static str,
        /// The entity id acted on.
        entity_id: i64,
        /// The value before the change, if meaningful.
        old_value: Option<String>,
        /// The value after the change, if meaningful.
        new_value: Option<String>,
    },
    /// A notification addressed to one user.
    Notify {
        /// The recipient user id.
        user_id: i64,
        /// Short title.
        title: String,
        /// Message body.
        message: String,
    },
    /// A notification addressed to all administrators.
    NotifyAdmins {
        /// Short title.
        title: String,
        /// Message body.
        message: String,
    },
    /// A venue-wide real-time event.
    Broadcast {
        /// The event name.
        event: &'static str,
        /// The event payload.
        payload: Value,
    },
}

/// Receiver for post-commit side effects.
///
/// Implementations wrap the venue's audit log, notification delivery, and
/// real-time channel. Delivery must be bounded by a short timeout; the
/// dispatcher treats any error as a delivery loss, not a transition
/// failure.
pub trait EffectSink {
    /// Records one audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit backend rejects the record.
    fn record(
        &self,
        actor_id: i64,
        action: &str,
        entity: &str,
        entity_id: i64,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Result<(), SinkError>;

    /// Delivers a notification to one user.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify(&self, user_id: i64, title: &str, message: &str) -> Result<(), SinkError>;

    /// Delivers a notification to all administrators.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn notify_admins(&self, title: &str, message: &str) -> Result<(), SinkError>;

    /// Publishes a venue-wide real-time event.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing fails.
    fn broadcast(&self, event: &str, payload: &Value) -> Result<(), SinkError>;
}

/// A sink that writes every effect to the log and delivers nothing.
///
/// Useful as a default wiring and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EffectSink for LogSink {
    fn record(
        &self,
        actor_id: i64,
        action: &str,
        entity: &str,
        entity_id: i64,
        _old_value: Option<&str>,
        _new_value: Option<&str>,
    ) -> Result<(), SinkError> {
        log::info!("audit: actor {actor_id} {action} {entity} {entity_id}");
        Ok(())
    }

    fn notify(&self, user_id: i64, title: &str, _message: &str) -> Result<(), SinkError> {
        log::info!("notify user {user_id}: {title}");
        Ok(())
    }

    fn notify_admins(&self, title: &str, _message: &str) -> Result<(), SinkError> {
        log::info!("notify admins: {title}");
        Ok(())
    }

    fn broadcast(&self, event: &str, _payload: &Value) -> Result<(), SinkError> {
        log::info!("broadcast: {event}");
        Ok(())
    }
}

/// Dispatches queued effects to the sink, logging and dropping failures.
pub(crate) fn dispatch(sink: &dyn EffectSink, effects: Vec<SideEffect>) {
    for effect in effects {
        let outcome = match &effect {
            SideEffect::Audit {
                actor_id,
                action,
                entity,
                entity_id,
                old_value,
                new_value,
            } => sink.record(
                *actor_id,
                action,
                entity,
                *entity_id,
                old_value.as_deref(),
                new_value.as_deref(),
            ),
            SideEffect::Notify {
                user_id,
                title,
                message,
            } => sink.notify(*user_id, title, message),
            SideEffect::NotifyAdmins { title, message } => sink.notify_admins(title, message),
            SideEffect::Broadcast { event, payload } => sink.broadcast(event, payload),
        };
        if let Err(e) = outcome {
            log::warn!("side effect dropped: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records delivered effects and fails on demand.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub delivered: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl EffectSink for RecordingSink {
        fn record(
            &self,
            actor_id: i64,
            action: &str,
            _entity: &str,
            entity_id: i64,
            _old: Option<&str>,
            _new: Option<&str>,
        ) -> Result<(), SinkError> {
            if self.fail {
                return Err("audit backend down".into());
            }
            self.delivered
                .lock()
                .unwrap()
                .push(format!("audit {actor_id} {action} {entity_id}"));
            Ok(())
        }

        fn notify(&self, user_id: i64, title: &str, _message: &str) -> Result<(), SinkError> {
            if self.fail {
                return Err("delivery timeout".into());
            }
            self.delivered
                .lock()
                .unwrap()
                .push(format!("notify {user_id} {title}"));
            Ok(())
        }

        fn notify_admins(&self, title: &str, _message: &str) -> Result<(), SinkError> {
            if self.fail {
                return Err("delivery timeout".into());
            }
            self.delivered
                .lock()
                .unwrap()
                .push(format!("notify-admins {title}"));
            Ok(())
        }

        fn broadcast(&self, event: &str, _payload: &Value) -> Result<(), SinkError> {
            if self.fail {
                return Err("channel closed".into());
            }
            self.delivered.lock().unwrap().push(format!("broadcast {event}"));
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_delivers_in_order() {
        let sink = RecordingSink::default();
        dispatch(
            &sink,
            vec![
                SideEffect::NotifyAdmins {
                    title: "new reservation".into(),
                    message: String::new(),
                },
                SideEffect::Broadcast {
                    event: "check_in",
                    payload: serde_json::json!({ "reservation_id": 1 }),
                },
            ],
        );
        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(
            *delivered,
            vec![
                "notify-admins new reservation".to_string(),
                "broadcast check_in".to_string()
            ]
        );
    }

    #[test]
    fn test_dispatch_swallows_sink_failures() {
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        // Must not panic or propagate
        dispatch(
            &sink,
            vec![SideEffect::Notify {
                user_id: 1,
                title: "t".into(),
                message: "m".into(),
            }],
        );
        assert!(sink.delivered.lock().unwrap().is_empty());
    }
}
