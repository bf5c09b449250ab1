//! Progress reporting for batch runs

use std::time::Duration;
use tracing::{debug, info};

/// Events emitted by the orchestrator as a batch advances.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BatchStarted {
        total: usize,
    },
    FileCompleted {
        index: usize,
        path: String,
        failed: bool,
    },
    BatchCompleted {
        total: usize,
        failed: usize,
        duration: Duration,
    },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// Default handler that forwards events to the tracing subscriber.
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { total } => {
                info!(total, "Batch started");
            }
            ProgressEvent::FileCompleted {
                index,
                path,
                failed,
            } => {
                debug!(index, path = %path, failed, "File completed");
            }
            ProgressEvent::BatchCompleted {
                total,
                failed,
                duration,
            } => {
                info!(total, failed, duration_ms = duration.as_millis() as u64, "Batch completed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_handler_accepts_all_events() {
        let handler = LoggingHandler;
        handler.on_progress(&ProgressEvent::BatchStarted { total: 3 });
        handler.on_progress(&ProgressEvent::FileCompleted {
            index: 0,
            path: "a.txt".to_string(),
            failed: false,
        });
        handler.on_progress(&ProgressEvent::BatchCompleted {
            total: 3,
            failed: 1,
            duration: Duration::from_millis(5),
        });
    }
}
