//! Per-request runtime statistics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::cache::lock::mutex_lock;

const COMPONENT: &str = "runtime::stats";

/// Shared handle on the runtime ledger of one request.
///
/// Clones point at the same ledger. A fresh handle is created per request, so
/// statistics of concurrent requests never mix.
#[derive(Debug, Clone)]
pub struct RuntimeStats {
    enabled: bool,
    ledger: Arc<Mutex<Ledger>>,
}

#[derive(Debug, Default)]
struct Ledger {
    components: Vec<ComponentLedger>,
    index: HashMap<&'static str, usize>,
    completions: u64,
}

#[derive(Debug)]
struct ComponentLedger {
    name: &'static str,
    operations: Vec<OperationLedger>,
    index: HashMap<&'static str, usize>,
    first_completed: Option<u64>,
}

#[derive(Debug)]
struct OperationLedger {
    name: &'static str,
    started_at: Option<Instant>,
    calls: u64,
    runtime: Duration,
    first_completed: Option<u64>,
}

/// Aggregated statistics of one component, as reported at request end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStat {
    pub class: &'static str,
    /// Milliseconds, rounded to three decimals.
    pub total_runtime: f64,
    pub total_count: u64,
    pub methods: Vec<MethodStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodStat {
    pub name: &'static str,
    /// Milliseconds, rounded to three decimals.
    pub runtime: f64,
    pub count: u64,
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self {
            enabled: true,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// A handle that ignores every recording; reports stay empty.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count a call and remember when it started.
    ///
    /// A second `begin` for the same operation before its completion moves the
    /// start forward, so nested calls of one operation under-report the outer
    /// call.
    pub(crate) fn begin(&self, component: &'static str, operation: &'static str, at: Instant) {
        if !self.enabled {
            return;
        }
        let mut ledger = mutex_lock(&self.ledger, COMPONENT, "begin");
        let entry = ledger.operation(component, operation);
        entry.calls += 1;
        entry.started_at = Some(at);
    }

    /// Add the time since the last `begin` to the operation's runtime.
    ///
    /// Returns `None` without recording anything when the operation was never
    /// started.
    pub(crate) fn complete(
        &self,
        component: &'static str,
        operation: &'static str,
        at: Instant,
    ) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        let mut ledger = mutex_lock(&self.ledger, COMPONENT, "complete");
        let started_at = ledger.find(component, operation)?.started_at?;
        let elapsed = at.saturating_duration_since(started_at);
        ledger.accumulate(component, operation, elapsed);
        Some(elapsed)
    }

    /// Record one finished call with a known runtime.
    pub fn record(&self, component: &'static str, operation: &'static str, runtime: Duration) {
        if !self.enabled {
            return;
        }
        let mut ledger = mutex_lock(&self.ledger, COMPONENT, "record");
        ledger.operation(component, operation).calls += 1;
        ledger.accumulate(component, operation, runtime);
    }

    /// Number of calls started for an operation, completed or not.
    pub fn call_count(&self, component: &'static str, operation: &'static str) -> u64 {
        let ledger = mutex_lock(&self.ledger, COMPONENT, "call_count");
        ledger
            .find(component, operation)
            .map(|entry| entry.calls)
            .unwrap_or(0)
    }

    /// Runtime accumulated by an operation, `None` until one call completed.
    pub fn runtime(&self, component: &'static str, operation: &'static str) -> Option<Duration> {
        let ledger = mutex_lock(&self.ledger, COMPONENT, "runtime");
        ledger
            .find(component, operation)
            .filter(|entry| entry.first_completed.is_some())
            .map(|entry| entry.runtime)
    }

    /// Aggregate the ledger into a ranked report.
    ///
    /// Only components with at least one completed operation appear, and only
    /// their completed operations. Components are ranked by total runtime and
    /// operations by runtime, both descending; ties keep the order in which
    /// entries first completed.
    pub fn get_stats(&self) -> Vec<ComponentStat> {
        let ledger = mutex_lock(&self.ledger, COMPONENT, "get_stats");

        let mut components: Vec<&ComponentLedger> = ledger
            .components
            .iter()
            .filter(|component| component.first_completed.is_some())
            .collect();
        components.sort_by_key(|component| component.first_completed);

        let mut stats: Vec<ComponentStat> = components
            .into_iter()
            .map(ComponentLedger::summarize)
            .collect();
        stats.sort_by(|lhs, rhs| rhs.total_runtime.total_cmp(&lhs.total_runtime));
        stats
    }
}

impl Default for RuntimeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    fn operation(
        &mut self,
        component: &'static str,
        operation: &'static str,
    ) -> &mut OperationLedger {
        let component_index = match self.index.get(component) {
            Some(index) => *index,
            None => {
                self.components.push(ComponentLedger {
                    name: component,
                    operations: Vec::new(),
                    index: HashMap::new(),
                    first_completed: None,
                });
                let index = self.components.len() - 1;
                self.index.insert(component, index);
                index
            }
        };

        let entry = &mut self.components[component_index];
        let operation_index = match entry.index.get(operation) {
            Some(index) => *index,
            None => {
                entry.operations.push(OperationLedger {
                    name: operation,
                    started_at: None,
                    calls: 0,
                    runtime: Duration::ZERO,
                    first_completed: None,
                });
                let index = entry.operations.len() - 1;
                entry.index.insert(operation, index);
                index
            }
        };
        &mut entry.operations[operation_index]
    }

    fn find(&self, component: &'static str, operation: &'static str) -> Option<&OperationLedger> {
        let entry = &self.components[*self.index.get(component)?];
        entry
            .index
            .get(operation)
            .map(|index| &entry.operations[*index])
    }

    fn accumulate(&mut self, component: &'static str, operation: &'static str, elapsed: Duration) {
        self.completions += 1;
        let sequence = self.completions;

        let component_index = match self.index.get(component) {
            Some(index) => *index,
            None => return,
        };
        let entry = &mut self.components[component_index];
        entry.first_completed.get_or_insert(sequence);

        if let Some(index) = entry.index.get(operation).copied() {
            let operation = &mut entry.operations[index];
            operation.runtime += elapsed;
            operation.first_completed.get_or_insert(sequence);
        }
    }
}

impl ComponentLedger {
    fn summarize(&self) -> ComponentStat {
        let mut completed: Vec<&OperationLedger> = self
            .operations
            .iter()
            .filter(|operation| operation.first_completed.is_some())
            .collect();
        completed.sort_by_key(|operation| operation.first_completed);

        let total_runtime: Duration = completed.iter().map(|operation| operation.runtime).sum();
        let total_count: u64 = completed.iter().map(|operation| operation.calls).sum();

        let mut methods: Vec<MethodStat> = completed
            .into_iter()
            .map(|operation| MethodStat {
                name: operation.name,
                runtime: round_millis(operation.runtime),
                count: operation.calls,
            })
            .collect();
        methods.sort_by(|lhs, rhs| rhs.runtime.total_cmp(&lhs.runtime));

        ComponentStat {
            class: self.name,
            total_runtime: round_millis(total_runtime),
            total_count,
            methods,
        }
    }
}

fn round_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1_000_000.0).round() / 1_000.0
}
