//! Call Recorder
//!
//! Append-only log of dispatched calls, in completion order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::TypeId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded dispatch outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Command display name
    pub command: String,
    /// Input as copied at dispatch time
    pub input: Value,
    /// Whether the call produced a result
    pub success: bool,
}

impl CallRecord {
    /// Create a new call record
    #[must_use]
    pub fn new(command: &str, input: Value, success: bool) -> Self {
        Self {
            command: command.to_string(),
            input,
            success,
        }
    }

    /// Whether this record belongs to the named command
    #[must_use]
    pub fn is_command(&self, name: &str) -> bool {
        self.command == name
    }
}

/// A record together with the exact type of the command that produced it
#[derive(Debug, Clone)]
struct Entry {
    command_type: TypeId,
    record: CallRecord,
}

/// Ordered log of call records
///
/// Records are keyed by command type as well as by display name, since two
/// command types may share a name.
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl CallRecorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record for a command of type `command_type`
    pub fn record(&self, command_type: TypeId, command: &str, input: Value, success: bool) {
        self.entries().push(Entry {
            command_type,
            record: CallRecord::new(command, input, success),
        });
    }

    /// Copy of the full log
    #[must_use]
    pub fn snapshot(&self) -> Vec<CallRecord> {
        self.entries().iter().map(|e| e.record.clone()).collect()
    }

    /// Copy of the records produced by commands of exactly `command_type`
    #[must_use]
    pub fn snapshot_of(&self, command_type: TypeId) -> Vec<CallRecord> {
        self.entries()
            .iter()
            .filter(|e| e.command_type == command_type)
            .map(|e| e.record.clone())
            .collect()
    }

    /// Take the full log, leaving it empty
    pub fn drain(&self) -> Vec<CallRecord> {
        std::mem::take(&mut *self.entries())
            .into_iter()
            .map(|e| e.record)
            .collect()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct PutItem;
    struct GetItem;
    struct GetItemV2;

    fn put() -> TypeId {
        TypeId::of::<PutItem>()
    }

    fn get() -> TypeId {
        TypeId::of::<GetItem>()
    }

    #[test]
    fn test_record_preserves_order() {
        let recorder = CallRecorder::new();
        recorder.record(put(), "PutItem", json!({"id": 1}), true);
        recorder.record(get(), "GetItem", json!({"id": 1}), false);

        let calls = recorder.snapshot();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], CallRecord::new("PutItem", json!({"id": 1}), true));
        assert_eq!(calls[1].command, "GetItem");
        assert!(!calls[1].success);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let recorder = CallRecorder::new();
        recorder.record(put(), "PutItem", json!({}), true);

        let mut calls = recorder.snapshot();
        calls.clear();
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_drain_empties() {
        let recorder = CallRecorder::new();
        recorder.record(put(), "A", json!(null), true);
        recorder.record(get(), "B", json!(null), true);

        let drained = recorder.drain();
        assert_eq!(drained.len(), 2);
        assert!(recorder.is_empty());
        assert!(recorder.drain().is_empty());
    }

    #[test]
    fn test_record_serializes_to_wire_shape() {
        let record = CallRecord::new("GetAccount", json!({}), true);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"command": "GetAccount", "input": {}, "success": true})
        );
        assert!(record.is_command("GetAccount"));
    }

    #[test]
    fn test_snapshot_of_uses_type_not_name() {
        let recorder = CallRecorder::new();
        recorder.record(get(), "GetItem", json!({"v": 1}), true);
        recorder.record(put(), "PutItem", json!({}), true);

        assert_eq!(recorder.snapshot_of(get()).len(), 1);
        assert!(recorder.snapshot_of(TypeId::of::<GetItemV2>()).is_empty());
    }

    #[test]
    fn test_poisoned_lock_keeps_recording() {
        let recorder = CallRecorder::new();
        recorder.record(put(), "PutItem", json!({}), true);

        let shared = recorder.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.entries();
            panic!("poisoned while recording");
        })
        .join();

        recorder.record(get(), "GetItem", json!({}), false);
        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.snapshot()[1].command, "GetItem");
        assert_eq!(recorder.drain().len(), 2);
    }
}
