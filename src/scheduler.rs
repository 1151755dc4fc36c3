//! The per-frame driver on the render thread.
//!
//! Each frame runs two phases. **Drain** pops pending commands off the queue without blocking
//! and dispatches them to the registry. **Present** clears the target, sets the projection,
//! draws every live shape in registry order and hands the frame to the backend for
//! presentation. [`FramePacer`] decides when the next frame is due.

use std::time::{Duration, Instant};

use crate::backend::Backend;
use crate::color::Color;
use crate::error::RenderError;
use crate::projection::Projection;
use crate::queue::Consumer;
use crate::registry::{Dispatch, Registry};

/// Counters for one [`FrameScheduler::frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Commands popped during drain.
    pub commands: usize,
    /// Shapes created during drain.
    pub created: usize,
    /// Shapes removed during drain.
    pub removed: usize,
    /// Live shapes after drain.
    pub shapes: usize,
    /// Shapes that issued a draw call.
    pub drawn: usize,
    /// Total commands the queue has displaced since startup.
    pub dropped: u64,
}

/// Owns the consumer half of the queue and the shape registry, and drives both each frame.
pub struct FrameScheduler<B: Backend> {
    consumer: Consumer,
    registry: Registry<B>,
    projection: Projection,
    clear_color: Color,
    last_dropped: u64,
}

impl<B: Backend> FrameScheduler<B> {
    /// Creates a scheduler for a target of `width` x `height` physical pixels.
    pub fn new(consumer: Consumer, width: u32, height: u32) -> Self {
        Self {
            consumer,
            registry: Registry::new(),
            projection: Projection::orthographic(width, height),
            clear_color: Color::BLACK,
            last_dropped: 0,
        }
    }

    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn registry(&self) -> &Registry<B> {
        &self.registry
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Recomputes the projection for a new target size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection = Projection::orthographic(width, height);
    }

    /// Pops and dispatches pending commands. Returns how many were applied.
    ///
    /// Never waits for the producer. At most one queue's worth of commands is applied per call,
    /// so a saturated producer cannot hold off the next present.
    pub fn drain(&mut self, backend: &mut B) -> usize {
        self.drain_counted(backend).commands
    }

    fn drain_counted(&mut self, backend: &mut B) -> FrameStats {
        let mut stats = FrameStats::default();
        let limit = self.consumer.capacity();
        let Self {
            consumer, registry, ..
        } = self;
        for command in consumer.drain(limit) {
            tracing::trace!(kind = ?command.kind, object_id = %command.object_id, "Dispatching");
            match registry.dispatch(&command, backend) {
                Dispatch::Created => stats.created += 1,
                Dispatch::Removed => stats.removed += 1,
                Dispatch::Updated | Dispatch::Ignored => {}
            }
            stats.commands += 1;
        }

        let dropped = self.consumer.dropped();
        if dropped > self.last_dropped {
            tracing::warn!(
                dropped = dropped - self.last_dropped,
                total = dropped,
                "Command queue overflowed, oldest commands were discarded"
            );
            self.last_dropped = dropped;
        }
        stats.dropped = dropped;
        stats
    }

    /// Clears the target, draws every live shape in registry order and presents the frame.
    pub fn present(&mut self, backend: &mut B) -> Result<FrameStats, RenderError> {
        backend.begin_frame(self.clear_color, &self.projection)?;
        let mut drawn = 0;
        for shape in self.registry.shapes_mut() {
            if shape.is_drawable() {
                drawn += 1;
            }
            shape.draw(backend);
        }
        backend.end_frame()?;

        Ok(FrameStats {
            shapes: self.registry.len(),
            drawn,
            dropped: self.consumer.dropped(),
            ..FrameStats::default()
        })
    }

    /// Runs one full frame: drain, then present.
    ///
    /// Commands applied during drain stay applied even when presenting fails.
    pub fn frame(&mut self, backend: &mut B) -> Result<FrameStats, RenderError> {
        let drained = self.drain_counted(backend);
        let presented = self.present(backend)?;
        Ok(FrameStats {
            commands: drained.commands,
            created: drained.created,
            removed: drained.removed,
            ..presented
        })
    }
}

/// The result of [`FramePacer::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pace {
    /// Whether a frame should be rendered now.
    pub due: bool,
    /// When the next frame is due.
    pub deadline: Instant,
}

/// Fixed-interval frame pacing.
///
/// Deadlines advance by whole intervals so the average rate holds; after a stall longer than
/// one interval the schedule restarts from the current time instead of bursting.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl FramePacer {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Pacing for `fps` frames per second. Zero is treated as one.
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reports whether a frame is due at `now`. When it is, the deadline moves forward.
    ///
    /// The first poll is always due.
    pub fn poll(&mut self, now: Instant) -> Pace {
        match self.deadline {
            Some(deadline) if now < deadline => Pace {
                due: false,
                deadline,
            },
            Some(deadline) => {
                let mut next = deadline + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.deadline = Some(next);
                Pace {
                    due: true,
                    deadline: next,
                }
            }
            None => {
                let next = now + self.interval;
                self.deadline = Some(next);
                Pace {
                    due: true,
                    deadline: next,
                }
            }
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::command::{Command, CommandKind, ShapeKind};
    use crate::queue;

    fn rect(id: &str) -> Command {
        Command::create(ShapeKind::Rect, id, (0.0, 0.0), (0.5, 0.5), Color::WHITE)
    }

    #[test]
    fn frame_drains_then_presents() {
        let (mut producer, consumer) = queue::bounded(8);
        let mut scheduler = FrameScheduler::new(consumer, 640, 480);
        let mut backend = RecordingBackend::new();

        producer.push(rect("b"));
        producer.push(rect("a"));
        producer.push(Command::new(CommandKind::SetPosition, "a").with_position(0.1, 0.1));

        let stats = scheduler.frame(&mut backend).unwrap();
        assert_eq!(stats.commands, 3);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.shapes, 2);
        assert_eq!(stats.drawn, 2);

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.clear_color, Color::BLACK);
        assert_eq!(frame.projection, Projection::orthographic(640, 480));
        let order: Vec<_> = frame.draws.iter().map(|draw| draw.buffer_id).collect();
        // "a" was created second, but draws first.
        assert_eq!(order, [2, 1]);
    }

    #[test]
    fn empty_queue_still_presents_last_state() {
        let (mut producer, consumer) = queue::bounded(4);
        let mut scheduler = FrameScheduler::new(consumer, 100, 100);
        let mut backend = RecordingBackend::new();

        producer.push(rect("a"));
        scheduler.frame(&mut backend).unwrap();
        let stats = scheduler.frame(&mut backend).unwrap();

        assert_eq!(stats.commands, 0);
        assert_eq!(backend.frames().len(), 2);
        assert_eq!(backend.frames()[1].draws.len(), 1);
    }

    #[test]
    fn drain_is_bounded_by_capacity() {
        let (mut producer, consumer) = queue::bounded(4);
        let mut scheduler: FrameScheduler<RecordingBackend> = FrameScheduler::new(consumer, 1, 1);
        let mut backend = RecordingBackend::new();

        for i in 0..4 {
            producer.push(rect(&i.to_string()));
        }
        assert_eq!(scheduler.drain(&mut backend), 4);
        assert_eq!(scheduler.drain(&mut backend), 0);
    }

    #[test]
    fn overflow_is_reported() {
        let (mut producer, consumer) = queue::bounded(2);
        let mut scheduler = FrameScheduler::new(consumer, 1, 1);
        let mut backend = RecordingBackend::new();

        for id in ["a", "b", "c"] {
            producer.push(rect(id));
        }
        let stats = scheduler.frame(&mut backend).unwrap();
        assert_eq!(stats.dropped, 1);
        assert!(!scheduler.registry().contains("a"));
        assert!(scheduler.registry().contains("c"));
    }

    #[test]
    fn failed_begin_keeps_applied_commands() {
        let (mut producer, consumer) = queue::bounded(2);
        let mut scheduler = FrameScheduler::new(consumer, 1, 1);
        let mut backend = RecordingBackend::new();
        backend.begin_frame(Color::BLACK, &Projection::default()).unwrap();

        producer.push(rect("a"));
        assert!(matches!(
            scheduler.frame(&mut backend),
            Err(RenderError::FrameInProgress)
        ));
        assert!(scheduler.registry().contains("a"));
    }

    #[test]
    fn resize_updates_projection() {
        let (_producer, consumer) = queue::bounded(1);
        let mut scheduler: FrameScheduler<RecordingBackend> = FrameScheduler::new(consumer, 100, 100);
        scheduler.resize(200, 100);
        assert_eq!(scheduler.projection(), &Projection::orthographic(200, 100));
    }

    #[test]
    fn pacer_fires_once_per_interval() {
        let start = Instant::now();
        let interval = Duration::from_millis(10);
        let mut pacer = FramePacer::new(interval);

        let first = pacer.poll(start);
        assert!(first.due);
        assert_eq!(first.deadline, start + interval);

        let early = pacer.poll(start + Duration::from_millis(5));
        assert!(!early.due);
        assert_eq!(early.deadline, start + interval);

        let on_time = pacer.poll(start + interval);
        assert!(on_time.due);
        assert_eq!(on_time.deadline, start + interval * 2);
    }

    #[test]
    fn pacer_resyncs_after_a_stall() {
        let start = Instant::now();
        let interval = Duration::from_millis(10);
        let mut pacer = FramePacer::new(interval);
        pacer.poll(start);

        let late = start + Duration::from_millis(100);
        let pace = pacer.poll(late);
        assert!(pace.due);
        assert_eq!(pace.deadline, late + interval);
        assert!(!pacer.poll(late + Duration::from_millis(1)).due);
    }

    #[test]
    fn pacer_from_fps() {
        assert_eq!(FramePacer::from_fps(50).interval(), Duration::from_millis(20));
        assert_eq!(FramePacer::from_fps(0).interval(), Duration::from_secs(1));
    }
}
