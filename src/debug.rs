//! Audio-thread diagnostics.
//!
//! Each [`TransientExtractor`](crate::TransientExtractor) owns the producer half
//! of a fixed-capacity `ringbuf` queue and pushes small `Copy` events into it.
//! Nothing on that path formats, allocates or blocks. The host takes the
//! consumer half once ([`TransientExtractor::take_trace`](crate::TransientExtractor::take_trace))
//! and calls [`TraceDrain::drain_to_log`] from a non-audio thread, where events
//! are formatted and handed to the `log` facade.
//!
//! One queue per engine keeps every ring strictly single-producer, so engines
//! on different threads never share a slot.
//!
//! Per-frame summaries are only pushed with the `debug` feature enabled.

use ringbuf::{Consumer, Producer, RingBuffer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Events held per engine before new ones are dropped.
pub const TRACE_CAPACITY: usize = 256;

/// `log` target used for drained events.
pub const TRACE_TARGET: &str = "transex::trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A frame of the wrong length was rejected and left untouched.
    FrameSizeMismatch { expected: usize, actual: usize },
    /// Detection summary of one processed frame (`debug` feature).
    Frame { index: u64, transient_bins: usize },
}

impl TraceEvent {
    fn emit(&self) {
        match *self {
            TraceEvent::FrameSizeMismatch { expected, actual } => log::warn!(
                target: TRACE_TARGET,
                "frame size mismatch: engine holds {} bins, frame has {}; frame skipped",
                expected,
                actual
            ),
            TraceEvent::Frame {
                index,
                transient_bins,
            } => log::debug!(
                target: TRACE_TARGET,
                "frame {} transient_bins {}",
                index,
                transient_bins
            ),
        }
    }
}

/// Audio-thread half. Never blocks; a full queue drops the event and counts it.
pub struct TraceSink {
    producer: Producer<TraceEvent>,
    dropped: Arc<AtomicUsize>,
}

impl TraceSink {
    #[inline]
    pub fn push(&mut self, event: TraceEvent) {
        if self.producer.push(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Host half.
pub struct TraceDrain {
    consumer: Consumer<TraceEvent>,
    dropped: Arc<AtomicUsize>,
}

impl TraceDrain {
    pub fn pop(&mut self) -> Option<TraceEvent> {
        self.consumer.pop()
    }

    /// Events lost to a full queue since the last drain.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Forward every queued event to the `log` facade. Mismatches go out at
    /// `warn`, frame summaries at `debug`. Returns the number forwarded.
    pub fn drain_to_log(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.consumer.pop() {
            event.emit();
            drained += 1;
        }
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            log::warn!(target: TRACE_TARGET, "{} trace events dropped (queue full)", dropped);
        }
        drained
    }
}

/// Allocate a queue. Call from a non-audio thread.
pub fn trace_channel(capacity: usize) -> (TraceSink, TraceDrain) {
    let (producer, consumer) = RingBuffer::<TraceEvent>::new(capacity).split();
    let dropped = Arc::new(AtomicUsize::new(0));
    (
        TraceSink {
            producer,
            dropped: Arc::clone(&dropped),
        },
        TraceDrain { consumer, dropped },
    )
}
