//! Bounded single-producer/single-consumer queue between the network thread and the render
//! thread.
//!
//! The queue has a fixed capacity and a **drop-oldest** overflow policy: pushing onto a full
//! queue displaces the oldest pending command, so the render thread always converges on the
//! most recent state a controller sent. Every displaced command is counted.
//!
//! Neither half is `Clone` and the mutating methods take `&mut self`, so there is exactly one
//! producer and one consumer. Publication ordering comes from the underlying
//! [`ArrayQueue`]: a command popped by the consumer is always fully written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::command::Command;

struct Shared {
    ring: ArrayQueue<Command>,
    dropped: AtomicU64,
}

/// Creates a queue holding at most `capacity` commands and returns its two halves.
///
/// A capacity of zero is raised to one.
///
/// # Examples
///
/// ```
/// use oscscene::queue;
/// use oscscene::{Command, CommandKind};
///
/// let (mut producer, mut consumer) = queue::bounded(2);
/// producer.push(Command::new(CommandKind::Remove, "a"));
/// producer.push(Command::new(CommandKind::Remove, "b"));
/// producer.push(Command::new(CommandKind::Remove, "c"));
///
/// // "a" was displaced by "c"
/// assert_eq!(consumer.pop().unwrap().object_id.as_str(), "b");
/// assert_eq!(consumer.pop().unwrap().object_id.as_str(), "c");
/// assert!(consumer.pop().is_none());
/// assert_eq!(consumer.dropped(), 1);
/// ```
pub fn bounded(capacity: usize) -> (Producer, Consumer) {
    let shared = Arc::new(Shared {
        ring: ArrayQueue::new(capacity.max(1)),
        dropped: AtomicU64::new(0),
    });
    (
        Producer {
            shared: shared.clone(),
        },
        Consumer { shared },
    )
}

/// The writing half, owned by the network thread.
pub struct Producer {
    shared: Arc<Shared>,
}

impl Producer {
    /// Enqueues a command. If the queue is full the oldest pending command is discarded and
    /// returned.
    pub fn push(&mut self, command: Command) -> Option<Command> {
        let displaced = self.shared.ring.force_push(command);
        if let Some(displaced) = &displaced {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                object_id = %displaced.object_id,
                kind = ?displaced.kind,
                "Queue full, dropped oldest command"
            );
        }
        displaced
    }

    pub fn capacity(&self) -> usize {
        self.shared.ring.capacity()
    }

    pub fn len(&self) -> usize {
        self.shared.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.ring.is_empty()
    }

    /// Total number of commands discarded by the overflow policy.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// The reading half, owned by the render thread.
pub struct Consumer {
    shared: Arc<Shared>,
}

impl Consumer {
    /// Takes the oldest pending command without blocking.
    pub fn pop(&mut self) -> Option<Command> {
        self.shared.ring.pop()
    }

    /// Pops up to `limit` commands, stopping early when the queue reports empty.
    pub fn drain(&mut self, limit: usize) -> Drain<'_> {
        Drain {
            consumer: self,
            remaining: limit,
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.ring.capacity()
    }

    pub fn len(&self) -> usize {
        self.shared.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.ring.is_empty()
    }

    /// Total number of commands discarded by the overflow policy.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// Iterator returned by [`Consumer::drain`].
pub struct Drain<'a> {
    consumer: &'a mut Consumer,
    remaining: usize,
}

impl Iterator for Drain<'_> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        if self.remaining == 0 {
            return None;
        }
        let command = self.consumer.pop()?;
        self.remaining -= 1;
        Some(command)
    }
}
