#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use stepwise_core::api::{SchedulerConfig, SchedulerEvent, SchedulerObserver, TaskDescriptor};

/// Tracks how many tasks are inside their work at once.
#[derive(Default)]
pub struct ConcurrencyProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Ordered log shared between tasks.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("journal has no entry {entry:?}"))
    }
}

/// Task that logs `<id>:start` / `<id>:end` around a sleep and returns its id.
pub fn sleeper(
    id: &str,
    millis: u64,
    probe: &Arc<ConcurrencyProbe>,
    journal: &Journal,
) -> TaskDescriptor<String> {
    let owned = id.to_string();
    let probe = Arc::clone(probe);
    let journal = journal.clone();
    TaskDescriptor::new(id, move || {
        let id = owned.clone();
        let probe = Arc::clone(&probe);
        let journal = journal.clone();
        async move {
            probe.enter();
            journal.push(format!("{id}:start"));
            tokio::time::sleep(Duration::from_millis(millis)).await;
            journal.push(format!("{id}:end"));
            probe.exit();
            Ok(id)
        }
    })
}

/// Task whose work always fails, counting attempts.
pub fn always_failing(id: &str, attempts: &Arc<AtomicUsize>) -> TaskDescriptor<()> {
    let attempts = Arc::clone(attempts);
    TaskDescriptor::new(id, move || {
        let attempts = Arc::clone(&attempts);
        async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("always fails")
        }
    })
}

pub fn config(max_concurrency: usize) -> SchedulerConfig {
    SchedulerConfig {
        max_concurrency,
        ..SchedulerConfig::default()
    }
}

/// Observer that records `event_type:task_id` strings.
#[derive(Default)]
pub struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl SchedulerObserver for EventLog {
    fn name(&self) -> &str {
        "event-log"
    }

    fn on_event(&self, event: &SchedulerEvent) {
        let entry = match event {
            SchedulerEvent::TaskStart { task_id, .. }
            | SchedulerEvent::TaskRetry { task_id, .. }
            | SchedulerEvent::TaskComplete { task_id, .. } => {
                format!("{}:{}", event.event_type(), task_id)
            }
            _ => event.event_type().to_string(),
        };
        self.0.lock().unwrap().push(entry);
    }
}

pub fn modify(step: u64, path: &str, prompt: &str) -> Value {
    json!({
        "step": step,
        "action": "modify_file",
        "description": format!("modify {path}"),
        "path": path,
        "modification_prompt": prompt,
    })
}

pub fn create_dir(step: u64, path: &str) -> Value {
    json!({"step": step, "action": "create_directory", "description": "mkdir", "path": path})
}

pub fn create_file(step: u64, path: &str, content: &str) -> Value {
    json!({"step": step, "action": "create_file", "description": "write", "path": path, "content": content})
}

pub fn run_command(step: u64, command: &str) -> Value {
    json!({"step": step, "action": "run_command", "description": "run", "command": command})
}

pub fn plan(steps: Vec<Value>) -> Value {
    json!({"description": "test plan", "steps": steps})
}
