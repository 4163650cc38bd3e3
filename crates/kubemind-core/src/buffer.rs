//! Resolution buffer: bounded many-writer, single-reader hand-off to the
//! memory consolidator.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DEFAULT_BUFFER_CAPACITY;
use crate::error::{KubeMindError, KubeMindResult};
use crate::types::IncidentResolution;

/// Writer side of the resolution buffer. Cheap to clone, one per producer.
#[derive(Clone)]
pub struct ResolutionBuffer {
    tx: mpsc::Sender<IncidentResolution>,
    capacity: usize,
}

/// Reader side of the resolution buffer. There is exactly one.
pub struct ResolutionReader {
    rx: mpsc::Receiver<IncidentResolution>,
}

impl ResolutionBuffer {
    /// Create a buffer holding at most `capacity` resolutions.
    ///
    /// A zero capacity is replaced by the default.
    pub fn channel(capacity: usize) -> (Self, ResolutionReader) {
        let capacity = if capacity == 0 {
            warn!(
                default = DEFAULT_BUFFER_CAPACITY,
                "Buffer capacity must be positive, using default"
            );
            DEFAULT_BUFFER_CAPACITY
        } else {
            capacity
        };

        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, capacity }, ResolutionReader { rx })
    }

    /// Maximum number of buffered resolutions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resolutions waiting for the consolidator.
    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    /// Whether no resolution is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand a resolution to the consolidator.
    ///
    /// Suspends while the buffer is full. If `cancel` fires first the
    /// resolution is dropped and [`KubeMindError::Cancelled`] is returned;
    /// it is not retried or kept anywhere else. Fails with
    /// [`KubeMindError::BufferClosed`] once the reader is gone.
    pub async fn write(
        &self,
        resolution: IncidentResolution,
        cancel: &CancellationToken,
    ) -> KubeMindResult<()> {
        let incident_id = resolution.incident_id.clone();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(incident_id = %incident_id, "Buffer write cancelled, resolution dropped");
                Err(KubeMindError::cancelled("resolution buffer write"))
            }
            sent = self.tx.send(resolution) => {
                sent.map_err(|_| KubeMindError::BufferClosed)?;
                debug!(incident_id = %incident_id, queued = self.len(), "Resolution buffered");
                Ok(())
            }
        }
    }
}

impl ResolutionReader {
    /// Wait for the next resolution, in arrival order.
    ///
    /// Returns `None` once every writer is dropped and the buffer is empty.
    pub async fn recv(&mut self) -> Option<IncidentResolution> {
        self.rx.recv().await
    }

    /// Take the next resolution if one is already waiting.
    pub fn try_recv(&mut self) -> Option<IncidentResolution> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::poll;
    use tokio_test::{assert_pending, assert_ready_ok, task};

    fn resolution(id: &str) -> IncidentResolution {
        IncidentResolution::new(id, "prod", "default", "oom killed", "raise limit")
    }

    #[tokio::test]
    async fn test_writes_up_to_capacity_do_not_suspend() {
        let (buffer, _reader) = ResolutionBuffer::channel(2);
        let cancel = CancellationToken::new();

        let mut first = Box::pin(buffer.write(resolution("INC-1"), &cancel));
        assert!(poll!(&mut first).is_ready());
        let mut second = Box::pin(buffer.write(resolution("INC-2"), &cancel));
        assert!(poll!(&mut second).is_ready());
        assert_eq!(buffer.len(), 2);
    }

    #[tokio::test]
    async fn test_full_buffer_suspends_until_drained() {
        let (buffer, mut reader) = ResolutionBuffer::channel(2);
        let cancel = CancellationToken::new();

        buffer.write(resolution("INC-1"), &cancel).await.unwrap();
        buffer.write(resolution("INC-2"), &cancel).await.unwrap();

        let mut third = task::spawn(buffer.write(resolution("INC-3"), &cancel));
        assert_pending!(third.poll());

        assert_eq!(reader.recv().await.unwrap().incident_id, "INC-1");
        assert!(third.is_woken());
        assert_ready_ok!(third.poll());

        assert_eq!(reader.recv().await.unwrap().incident_id, "INC-2");
        assert_eq!(reader.recv().await.unwrap().incident_id, "INC-3");
    }

    #[tokio::test]
    async fn test_cancelled_write_fails_explicitly() {
        let (buffer, mut reader) = ResolutionBuffer::channel(1);
        let cancel = CancellationToken::new();

        buffer.write(resolution("INC-1"), &cancel).await.unwrap();

        let mut blocked = Box::pin(buffer.write(resolution("INC-2"), &cancel));
        assert!(poll!(&mut blocked).is_pending());

        cancel.cancel();
        let err = blocked.await.unwrap_err();
        assert!(err.is_cancellation());

        assert_eq!(reader.recv().await.unwrap().incident_id, "INC-1");
        assert!(reader.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_write_after_reader_dropped() {
        let (buffer, reader) = ResolutionBuffer::channel(4);
        drop(reader);

        let err = buffer
            .write(resolution("INC-1"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, KubeMindError::BufferClosed));
    }

    #[tokio::test]
    async fn test_zero_capacity_uses_default() {
        let (buffer, _reader) = ResolutionBuffer::channel(0);
        assert_eq!(buffer.capacity(), DEFAULT_BUFFER_CAPACITY);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_fifo_per_writer() {
        let (buffer, mut reader) = ResolutionBuffer::channel(8);
        let cancel = CancellationToken::new();

        for i in 0..5 {
            buffer
                .write(resolution(&format!("INC-{}", i)), &cancel)
                .await
                .unwrap();
        }

        for i in 0..5 {
            assert_eq!(reader.recv().await.unwrap().incident_id, format!("INC-{}", i));
        }
    }
}
