//! Shared scope bookkeeping: id assignment, name, extra-data bag, named locks.
//!
//! Exposed through `ServiceProvider`/`Scope` as the external-interface "scope
//! properties" (`scope_id`, `scope_name`, `get_extra_data`/`set_extra_data`,
//! `get_lock_object`). Every scope node, root or child, owns one of these.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// Assigns a process-wide unique scope id via a single atomic counter.
///
/// Chosen over the racy "write a GUID, parse it back" pattern: the id is
/// stable the instant it's read, with no window where two threads could
/// observe different values for the same scope.
pub(crate) fn next_scope_id() -> u64 {
    NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) type AnyValue = Arc<dyn Any + Send + Sync>;

pub(crate) struct ScopeData {
    id: u64,
    name: String,
    extra_data: Mutex<HashMap<String, AnyValue>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScopeData {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: next_scope_id(),
            name: name.into(),
            extra_data: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn get_extra_data(&self, key: &str) -> Option<AnyValue> {
        self.extra_data.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn set_extra_data(&self, key: impl Into<String>, value: AnyValue) {
        self.extra_data.lock().unwrap().insert(key.into(), value);
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.extra_data.lock().unwrap().keys().cloned().collect()
    }

    pub(crate) fn values(&self) -> Vec<AnyValue> {
        self.extra_data.lock().unwrap().values().cloned().collect()
    }

    pub(crate) fn get_lock_object(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(name.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}
