//! Per-call tool events and the sinks that receive them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::normalizer::UsageMetrics;

/// How a tool call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolOutcome {
    /// The call produced a result.
    Success,
    /// The call failed.
    Error,
    /// The provider declined to answer.
    Blocked,
}

/// One record per tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEvent {
    /// Tool name.
    pub tool: String,
    /// Model used, for tools that call one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// How the call ended.
    pub outcome: ToolOutcome,
    /// Wall-clock duration.
    pub duration_ms: u64,
    /// Token usage, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetrics>,
    /// Error text for failed calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the call finished.
    pub timestamp: DateTime<Utc>,
}

/// Receives one event per completed tool call.
pub trait EventSink: Send + Sync {
    /// Records one finished call.
    fn record_event(&self, event: &ToolEvent);
}

/// Emits each event as an `info` (or `warn` for errors) tracing event.
#[derive(Debug, Default, Clone)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record_event(&self, event: &ToolEvent) {
        let usage = event.usage.unwrap_or_default();
        match event.outcome {
            ToolOutcome::Error => tracing::warn!(
                tool = %event.tool,
                model = event.model.as_deref().unwrap_or("-"),
                duration_ms = event.duration_ms,
                error = event.error.as_deref().unwrap_or(""),
                "Tool call failed"
            ),
            outcome => tracing::info!(
                tool = %event.tool,
                model = event.model.as_deref().unwrap_or("-"),
                outcome = ?outcome,
                duration_ms = event.duration_ms,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Tool call completed"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record_event(&self, _event: &ToolEvent) {}
}

/// Aggregate counters for one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    /// Calls seen.
    pub calls: u64,
    /// Calls that failed.
    pub errors: u64,
    /// Calls the provider blocked.
    pub blocked: u64,
    /// Prompt tokens summed over calls.
    pub prompt_tokens: u64,
    /// Completion tokens summed over calls.
    pub completion_tokens: u64,
    /// Total tokens summed over calls.
    pub total_tokens: u64,
    /// Duration summed over calls.
    pub total_duration_ms: u64,
}

/// Keeps the most recent events in a bounded buffer.
#[derive(Debug)]
pub struct InMemoryEventSink {
    events: Mutex<VecDeque<ToolEvent>>,
    capacity: usize,
}

impl InMemoryEventSink {
    /// A reasonable capacity for a long-running process.
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// Creates a sink that keeps at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Snapshot of buffered events, oldest first.
    pub fn events(&self) -> Vec<ToolEvent> {
        self.lock().iter().cloned().collect()
    }

    /// Per-tool totals over the buffered events.
    pub fn summary(&self) -> BTreeMap<String, ToolSummary> {
        let mut summary: BTreeMap<String, ToolSummary> = BTreeMap::new();
        for event in self.lock().iter() {
            let entry = summary.entry(event.tool.clone()).or_default();
            entry.calls += 1;
            entry.total_duration_ms += event.duration_ms;
            match event.outcome {
                ToolOutcome::Error => entry.errors += 1,
                ToolOutcome::Blocked => entry.blocked += 1,
                ToolOutcome::Success => {}
            }
            if let Some(usage) = event.usage {
                entry.prompt_tokens += u64::from(usage.prompt_tokens);
                entry.completion_tokens += u64::from(usage.completion_tokens);
                entry.total_tokens += u64::from(usage.total_tokens);
            }
        }
        summary
    }

    /// Drops every buffered event.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<ToolEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryEventSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventSink for InMemoryEventSink {
    fn record_event(&self, event: &ToolEvent) {
        let mut events = self.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
