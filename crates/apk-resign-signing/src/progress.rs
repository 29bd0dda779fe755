//! Progress events and the handle used to consume them

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError};

/// One step reported by a running re-sign job.
///
/// A stream holds any number of `Progress` events with non-decreasing
/// values, followed by exactly one `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Intermediate progress, 0-100
    Progress { value: u8, status: String },
    /// The signed package was written
    Complete { output_path: PathBuf },
    /// The job failed
    Error { message: String },
}

impl ProgressEvent {
    pub(crate) fn progress(value: u8, status: impl Into<String>) -> Self {
        Self::Progress {
            value: value.min(100),
            status: status.into(),
        }
    }

    /// `Complete` or `Error`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Receiving end of a job's event stream.
///
/// [`drain`](Self::drain) never blocks, so a foreground loop can call it on
/// every tick. Once the terminal event has been handed out the handle is
/// finished and returns nothing more.
#[derive(Debug)]
pub struct ResignHandle {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    finished: bool,
}

impl ResignHandle {
    pub(crate) fn new(events: mpsc::UnboundedReceiver<ProgressEvent>) -> Self {
        Self {
            events,
            finished: false,
        }
    }

    /// Take every event that is ready right now
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut ready = Vec::new();
        while !self.finished {
            match self.events.try_recv() {
                Ok(event) => self.accept(event, &mut ready),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.accept(lost_task(), &mut ready),
            }
        }
        ready
    }

    /// Whether the terminal event has been delivered
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the job to end and return all remaining events
    pub async fn wait(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while !self.finished {
            let event = self.events.recv().await.unwrap_or_else(lost_task);
            self.accept(event, &mut events);
        }
        events
    }

    fn accept(&mut self, event: ProgressEvent, into: &mut Vec<ProgressEvent>) {
        self.finished = event.is_terminal();
        into.push(event);
    }
}

/// Stand-in terminal event for a task that went away without reporting
fn lost_task() -> ProgressEvent {
    ProgressEvent::Error {
        message: "Signing task ended without reporting a result".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(ProgressEvent::progress(30, "Signing...")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "progress", "value": 30, "status": "Signing..."}));

        let json = serde_json::to_value(ProgressEvent::Complete {
            output_path: PathBuf::from("app_resigned.apk"),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "complete", "output_path": "app_resigned.apk"}));

        let json = serde_json::to_value(ProgressEvent::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "error", "message": "boom"}));
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(
            ProgressEvent::progress(150, "x"),
            ProgressEvent::Progress {
                value: 100,
                status: "x".to_string()
            }
        );
    }

    #[test]
    fn test_drain_stops_after_terminal() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut handle = ResignHandle::new(rx);
        assert!(handle.drain().is_empty());

        tx.send(ProgressEvent::progress(10, "a")).unwrap();
        tx.send(ProgressEvent::Error {
            message: "bad".to_string(),
        })
        .unwrap();
        tx.send(ProgressEvent::progress(20, "late")).unwrap();

        let events = handle.drain();
        assert_eq!(events.len(), 2);
        assert!(handle.is_finished());
        assert!(handle.drain().is_empty());
    }

    #[test]
    fn test_drain_reports_lost_task() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut handle = ResignHandle::new(rx);
        tx.send(ProgressEvent::progress(10, "a")).unwrap();
        drop(tx);

        let events = handle.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ProgressEvent::Error { .. }));
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_wait_collects_until_terminal() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ProgressEvent::progress(10, "a")).unwrap();
        tx.send(ProgressEvent::Complete {
            output_path: PathBuf::from("out.apk"),
        })
        .unwrap();

        let events = ResignHandle::new(rx).wait().await;
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());
    }
}
