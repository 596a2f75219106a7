//! Per-invocation progress channel.
//!
//! One [`ProgressEmitter`] feeds one [`ProgressStream`]. The stream ends
//! after the first terminal event; an emitter dropped before sending one
//! yields `Failed(Aborted)` instead.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::pipeline::types::{PipelineError, ProgressEvent};

/// Create a connected emitter/stream pair.
pub fn channel() -> (ProgressEmitter, ProgressStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressEmitter { tx: Some(tx) },
        ProgressStream {
            rx,
            finished: false,
        },
    )
}

/// Producer half. Events after the terminal one are discarded.
#[derive(Debug)]
pub struct ProgressEmitter {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressEmitter {
    pub fn emit(&mut self, event: ProgressEvent) {
        let terminal = event.is_terminal();
        if let Some(tx) = &self.tx {
            // A dropped consumer is not an error for the producer.
            let _ = tx.send(event);
        }
        if terminal {
            self.tx = None;
        }
    }

    /// True once a terminal event has been sent.
    pub fn is_finished(&self) -> bool {
        self.tx.is_none()
    }
}

impl Drop for ProgressEmitter {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!("Progress emitter dropped without a terminal event");
            let _ = tx.send(ProgressEvent::Failed(PipelineError::Aborted));
        }
    }
}

/// Consumer half: an ordered stream of events ending with exactly one
/// terminal event.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
    finished: bool,
}

impl ProgressStream {
    /// Next event, or `None` after the terminal event.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.next().await
    }

    /// Drain the stream.
    pub async fn collect_events(self) -> Vec<ProgressEvent> {
        self.collect().await
    }

    /// Wait for the terminal event, discarding intermediate progress.
    pub async fn outcome(mut self) -> Result<ProgressEvent, PipelineError> {
        let mut last = None;
        while let Some(event) = self.next().await {
            last = Some(event);
        }
        match last {
            Some(ProgressEvent::Failed(e)) => Err(e),
            Some(event) => Ok(event),
            None => Err(PipelineError::Aborted),
        }
    }
}

impl Stream for ProgressStream {
    type Item = ProgressEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    this.finished = true;
                    this.rx.close();
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
