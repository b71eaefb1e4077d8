//! Named span timings (the CPU profiling hook for engine passes)

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Accumulated timings for one span name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStats {
    pub calls: u64,
    pub total: Duration,
    pub max: Duration,
}

impl SpanStats {
    pub fn mean(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.calls += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
    }
}

pub struct SpanProfiler {
    spans: HashMap<&'static str, SpanStats>,
}

impl SpanProfiler {
    pub fn new() -> Self {
        Self {
            spans: HashMap::new(),
        }
    }

    /// Run `f`, recording its wall time under `name`.
    pub fn time_span<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.record(name, start.elapsed());
        result
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        self.spans.entry(name).or_default().record(elapsed);
    }

    pub fn stats(&self, name: &str) -> SpanStats {
        self.spans.get(name).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.spans.clear();
    }

    /// Spans in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, SpanStats)> + '_ {
        let mut names: Vec<_> = self.spans.keys().copied().collect();
        names.sort_unstable();
        names.into_iter().map(|name| (name, self.spans[name]))
    }
}

impl Default for SpanProfiler {
    fn default() -> Self {
        Self::new()
    }
}
