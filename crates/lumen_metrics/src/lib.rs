//! Lumen Metrics - CPU profiling hooks and frame timing
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use lumen_metrics::SpanProfiler;
//!
//! let mut profiler = SpanProfiler::new();
//! profiler.time_span("Sort Irradiance Probes", || probes.sort_by_priority(&mut refs))?;
//! println!("{:?}", profiler.stats("Sort Irradiance Probes").mean());
//! ```
//!
//! Without the `metrics` feature the profiler and frame timer are stubs:
//! spans still run their closure, nothing is recorded. [`RingBuffer`] is
//! always available.

#[cfg(feature = "metrics")]
mod frame_timer;
mod ring_buffer;
#[cfg(feature = "metrics")]
mod span_profiler;

#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use span_profiler::{SpanProfiler, SpanStats};

// ============================================================================
// Macros
// ============================================================================

/// Time a block into a span (zero-cost when metrics disabled)
#[macro_export]
macro_rules! time_scope {
    ($profiler:expr, $name:expr, $body:block) => {
        $profiler.time_span($name, || $body)
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStats {
    pub calls: u64,
    pub total: std::time::Duration,
    pub max: std::time::Duration,
}

#[cfg(not(feature = "metrics"))]
impl SpanStats {
    pub fn mean(&self) -> std::time::Duration { std::time::Duration::ZERO }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct SpanProfiler;

#[cfg(not(feature = "metrics"))]
impl SpanProfiler {
    pub fn new() -> Self { Self }
    #[inline(always)]
    pub fn time_span<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn record(&mut self, _name: &'static str, _elapsed: std::time::Duration) {}
    pub fn stats(&self, _name: &str) -> SpanStats { SpanStats::default() }
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, SpanStats)> + '_ {
        std::iter::empty()
    }
}

#[cfg(not(feature = "metrics"))]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_window: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn push(&mut self, _frame_time: std::time::Duration) {}
    pub fn average(&self) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn fps(&self) -> f64 { 0.0 }
    pub fn frame_time_ms(&self) -> f64 { 0.0 }
    pub fn frame_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}
