use std::collections::HashMap;
use std::time::Instant;

/// Observer for overlay session events.
///
/// The session reports what it did and how long each service round trip took;
/// the implementation decides where that goes.
pub trait SessionLogger: Send {
    /// Called once per displayed frame.
    fn frame(&mut self, index: usize);

    /// Record how long a named operation took (e.g. "recognize").
    fn timing(&mut self, operation: &str, duration_ms: f64);

    /// Record a point-in-time value (e.g. live annotation count).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and one-shot commands.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: usize) {}
    fn timing(&mut self, _operation: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregate of the values recorded under one key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunningStats {
    pub count: usize,
    pub sum: f64,
    pub peak: f64,
}

impl RunningStats {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            peak: f64::MIN,
        }
    }

    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.peak = self.peak.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Forwards to the `log` crate and keeps per-operation timing and metric
/// aggregates for a summary when the session ends.
///
/// Frame counts are logged every `throttle_frames` frames. Storage grows with
/// the number of distinct keys, not with the number of calls.
pub struct LogSessionLogger {
    throttle_frames: usize,
    timings: HashMap<String, RunningStats>,
    metrics: HashMap<String, RunningStats>,
    start_time: Instant,
    frames: usize,
}

impl LogSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Returns the formatted summary, or `None` if nothing was displayed.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} frames, {elapsed_s:.1}s):",
            self.frames
        )];

        let mut operations: Vec<_> = self.timings.keys().collect();
        operations.sort();
        for operation in operations {
            let stats = &self.timings[operation];
            lines.push(format!(
                "  {operation:10}: {} call(s), avg {:6.1}ms, total {:7.0}ms",
                stats.count,
                stats.mean(),
                stats.sum
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let stats = &self.metrics[name];
            lines.push(format!(
                "  {name}: avg {:.1}, peak {:.0}",
                stats.mean(),
                stats.peak
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_stats(&self, operation: &str) -> Option<&RunningStats> {
        self.timings.get(operation)
    }

    pub fn metric_stats(&self, name: &str) -> Option<&RunningStats> {
        self.metrics.get(name)
    }
}

impl Default for LogSessionLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SessionLogger for LogSessionLogger {
    fn frame(&mut self, index: usize) {
        self.frames += 1;
        if self.frames % self.throttle_frames == 0 {
            log::info!("Displayed {} frames (last index {index})", self.frames);
        } else {
            log::debug!("Displayed frame {index}");
        }
    }

    fn timing(&mut self, operation: &str, duration_ms: f64) {
        self.timings
            .entry(operation.to_string())
            .or_insert_with(RunningStats::new)
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_insert_with(RunningStats::new)
            .record(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
