//! Process-wide registry of active polling tasks.
//!
//! The registry is an explicit object passed by reference to whoever needs
//! to start or stop tasks; there is no ambient singleton. Its map is the
//! only shared mutable resource in the coordinator and is guarded by a
//! mutex, since `stop_by_session` iterates while completed tasks may be
//! unregistering themselves concurrently.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Control block for one registered task.
#[derive(Debug, Clone)]
struct RegisteredTask {
    session_id: String,
    cancel: CancellationToken,
}

/// Mapping of request id → active polling task.
///
/// A request id appears at most once. Entries are added when a task starts
/// and removed when it terminates, normally or via stop. Teardown of the
/// owning workspace is [`TaskRegistry::stop_all`].
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, RegisteredTask>>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the registry.
    ///
    /// Returns false (and changes nothing) if a task with the same request
    /// id is already registered; submission is expected to always produce a
    /// fresh id.
    pub fn register(
        &self,
        request_id: impl Into<String>,
        session_id: impl Into<String>,
        cancel: CancellationToken,
    ) -> bool {
        let request_id = request_id.into();
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.contains_key(&request_id) {
            return false;
        }
        debug!(request_id = %request_id, "task registered");
        tasks.insert(
            request_id,
            RegisteredTask {
                session_id: session_id.into(),
                cancel,
            },
        );
        true
    }

    /// Removes a task. No-op if absent.
    pub fn unregister(&self, request_id: &str) -> bool {
        let removed = self.tasks.lock().unwrap().remove(request_id).is_some();
        if removed {
            debug!(request_id = %request_id, "task unregistered");
        }
        removed
    }

    /// Stops one task and removes it. No-op if already removed.
    pub fn stop(&self, request_id: &str) -> bool {
        let entry = self.tasks.lock().unwrap().remove(request_id);
        match entry {
            Some(task) => {
                task.cancel.cancel();
                debug!(request_id = %request_id, "task stopped");
                true
            }
            None => false,
        }
    }

    /// Stops every registered task and clears the map.
    pub fn stop_all(&self) {
        let drained: Vec<(String, RegisteredTask)> =
            self.tasks.lock().unwrap().drain().collect();
        for (request_id, task) in drained {
            task.cancel.cancel();
            debug!(request_id = %request_id, "task stopped");
        }
    }

    /// Stops every task of one session, leaving other sessions' tasks alone.
    ///
    /// Returns the number of tasks stopped.
    pub fn stop_by_session(&self, session_id: &str) -> usize {
        let mut stopped = Vec::new();
        {
            let mut tasks = self.tasks.lock().unwrap();
            tasks.retain(|request_id, task| {
                if task.session_id == session_id {
                    stopped.push((request_id.clone(), task.cancel.clone()));
                    false
                } else {
                    true
                }
            });
        }
        for (request_id, cancel) in &stopped {
            cancel.cancel();
            debug!(request_id = %request_id, session_id = %session_id, "task stopped");
        }
        stopped.len()
    }

    /// Returns true if a task is registered under the given request id.
    pub fn contains(&self, request_id: &str) -> bool {
        self.tasks.lock().unwrap().contains_key(request_id)
    }

    /// Number of active tasks.
    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Returns true if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().unwrap().is_empty()
    }
}
