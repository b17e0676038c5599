//! One-way progress reporting.
//!
//! Long stages report a percentage through a [`ProgressSink`]. The planner
//! never waits on the sink and never sees its failures: [`Progress`] clamps
//! values to `[0, 100]`, drops decreasing values, and catches a panicking sink
//! (after which the sink is no longer called).

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Receiver of progress percentages in `[0, 100]`.
pub trait ProgressSink {
    fn report(&self, percent: f64);
}

impl<F: Fn(f64)> ProgressSink for F {
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// Sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: f64) {}
}

/// Monotone, panic-proof wrapper around a caller's sink.
pub struct Progress<'a> {
    sink: &'a dyn ProgressSink,
    last: Cell<f64>,
    broken: Cell<bool>,
}

impl<'a> Progress<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            last: Cell::new(0.0),
            broken: Cell::new(false),
        }
    }

    /// Last value forwarded to the sink.
    pub fn last(&self) -> f64 {
        self.last.get()
    }

    pub fn report(&self, percent: f64) {
        if self.broken.get() || !percent.is_finite() {
            return;
        }
        let v = percent.clamp(0.0, 100.0);
        if v < self.last.get() {
            return;
        }
        self.last.set(v);
        let sink = self.sink;
        if catch_unwind(AssertUnwindSafe(|| sink.report(v))).is_err() {
            tracing::warn!(percent = v, "progress sink panicked; further reports dropped");
            self.broken.set(true);
        }
    }

    /// Report `done/total` of the way from `lo` to `hi`.
    pub fn report_span(&self, lo: f64, hi: f64, done: usize, total: usize) {
        let frac = if total == 0 {
            1.0
        } else {
            done as f64 / total as f64
        };
        self.report(lo + (hi - lo) * frac.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn values_are_clamped_and_monotone() {
        let seen = RefCell::new(Vec::new());
        let sink = |p: f64| seen.borrow_mut().push(p);
        let progress = Progress::new(&sink);
        for v in [-5.0, 10.0, 5.0, f64::NAN, 30.0, 250.0] {
            progress.report(v);
        }
        assert_eq!(*seen.borrow(), vec![0.0, 10.0, 30.0, 100.0]);
    }

    #[test]
    fn panicking_sink_is_swallowed() {
        let calls = Cell::new(0);
        let sink = |_p: f64| {
            calls.set(calls.get() + 1);
            panic!("sink failure");
        };
        let progress = Progress::new(&sink);
        progress.report(1.0);
        progress.report(2.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(progress.last(), 1.0);
    }

    #[test]
    fn span_interpolates() {
        let seen = RefCell::new(Vec::new());
        let sink = |p: f64| seen.borrow_mut().push(p);
        let progress = Progress::new(&sink);
        progress.report_span(30.0, 90.0, 1, 2);
        progress.report_span(30.0, 90.0, 0, 0);
        assert_eq!(*seen.borrow(), vec![60.0, 90.0]);
    }
}
