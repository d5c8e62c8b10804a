//! Progress reporting for a generation run.

/// Sender for reporting progress while a plan runs.
///
/// Wraps a callback that receives a progress percentage (0.0 -- 100.0) and
/// the label of the step that just finished.
pub struct ProgressSender {
    callback: Box<dyn Fn(f32, &str) + Send + Sync>,
}

impl ProgressSender {
    /// Create a new sender from the given callback.
    pub fn new(callback: impl Fn(f32, &str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a no-op sender that discards all progress reports.
    pub fn noop() -> Self {
        Self {
            callback: Box::new(|_, _| {}),
        }
    }

    /// Report progress.
    pub fn send(&self, progress: f32, step: &str) {
        (self.callback)(progress, step);
    }

    /// Report completion of step `done` out of `total`.
    pub fn step_done(&self, done: usize, total: usize, step: &str) {
        let pct = if total > 0 {
            done as f32 / total as f32 * 100.0
        } else {
            100.0
        };
        self.send(pct, step);
        tracing::info!("[{:.0}%] Completed: {}", pct, step);
    }
}

impl Default for ProgressSender {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for ProgressSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSender").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn step_done_reports_percentage() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let reports_clone = reports.clone();
        let progress = ProgressSender::new(move |pct, step| {
            reports_clone.lock().unwrap().push((pct, step.to_string()));
        });

        progress.step_done(1, 4, "a");
        progress.step_done(4, 4, "b");

        let rpts = reports.lock().unwrap();
        assert_eq!(rpts.len(), 2);
        assert_eq!(rpts[0], (25.0, "a".to_string()));
        assert_eq!(rpts[1], (100.0, "b".to_string()));
    }

    #[test]
    fn zero_total_is_complete() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        let progress = ProgressSender::new(move |pct, _| {
            *seen_clone.lock().unwrap() = Some(pct);
        });
        progress.step_done(0, 0, "nothing");
        assert_eq!(*seen.lock().unwrap(), Some(100.0));
    }
}
