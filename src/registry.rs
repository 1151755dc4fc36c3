//! Identifier-keyed ownership of live shapes and the command dispatch rules.

use std::collections::btree_map::{self, BTreeMap, Entry};

use crate::backend::Backend;
use crate::command::{Command, CommandKind};
use crate::id::ObjectId;
use crate::shape::Shape;

/// What [`Registry::dispatch`] did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// A new shape was constructed and inserted.
    Created,
    /// An existing shape was mutated in place.
    Updated,
    /// A shape was destroyed and its entry erased.
    Removed,
    /// The command addressed no live shape and had no effect.
    Ignored,
}

/// Owns every live shape, keyed by object id.
///
/// Iteration is in lexicographic id order, which is the order shapes are drawn in. The registry
/// lives on the render thread and is only ever touched through `&mut self`.
pub struct Registry<B: Backend> {
    shapes: BTreeMap<ObjectId, Shape<B>>,
}

impl<B: Backend> Registry<B> {
    pub fn new() -> Self {
        Self {
            shapes: BTreeMap::new(),
        }
    }

    /// Applies one command. Never fails: anything that does not match a live shape is ignored.
    pub fn dispatch(&mut self, command: &Command, backend: &mut B) -> Dispatch {
        if command.kind == CommandKind::Remove {
            return match self.shapes.remove(command.object_id.as_str()) {
                Some(shape) => {
                    tracing::debug!(object_id = %command.object_id, kind = ?shape.kind(), "Removed shape");
                    Dispatch::Removed
                }
                None => Dispatch::Ignored,
            };
        }

        match self.shapes.entry(command.object_id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().apply(command);
                Dispatch::Updated
            }
            Entry::Vacant(entry) => match Shape::new(command, backend) {
                Some(shape) => {
                    tracing::debug!(object_id = %command.object_id, kind = ?shape.kind(), "Created shape");
                    entry.insert(shape);
                    Dispatch::Created
                }
                None => Dispatch::Ignored,
            },
        }
    }

    pub fn get(&self, object_id: &str) -> Option<&Shape<B>> {
        self.shapes.get(object_id)
    }

    pub fn contains(&self, object_id: &str) -> bool {
        self.shapes.contains_key(object_id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Live shapes in draw order.
    pub fn iter(&self) -> btree_map::Iter<'_, ObjectId, Shape<B>> {
        self.shapes.iter()
    }

    pub(crate) fn shapes_mut(&mut self) -> btree_map::ValuesMut<'_, ObjectId, Shape<B>> {
        self.shapes.values_mut()
    }

    /// Destroys every shape, releasing their resources.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl<B: Backend> Default for Registry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> std::fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.shapes.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::color::{Channel, Color};
    use crate::command::{Point, ShapeKind};

    const UPDATE_KINDS: [CommandKind; 7] = [
        CommandKind::SetPosition,
        CommandKind::SetSize,
        CommandKind::SetColor,
        CommandKind::SetChannelRed,
        CommandKind::SetChannelGreen,
        CommandKind::SetChannelBlue,
        CommandKind::SetChannelAlpha,
    ];

    fn setup() -> (Registry<RecordingBackend>, RecordingBackend) {
        (Registry::new(), RecordingBackend::new())
    }

    #[test]
    fn creating_twice_keeps_one_entry_and_redefines() {
        let (mut registry, mut backend) = setup();
        let first = Command::create(ShapeKind::Rect, "r", (0.0, 0.0), (1.0, 1.0), Color::WHITE);
        let second = Command::create(ShapeKind::Rect, "r", (5.0, 5.0), (2.0, 2.0), Color::BLACK);

        assert_eq!(registry.dispatch(&first, &mut backend), Dispatch::Created);
        assert_eq!(registry.dispatch(&second, &mut backend), Dispatch::Updated);

        assert_eq!(registry.len(), 1);
        assert_eq!(backend.live_buffers(), 1);
        let rect = registry.get("r").unwrap();
        assert_eq!(rect.position(), Point::new(5.0, 5.0));
        assert_eq!(rect.size(), Point::new(2.0, 2.0));
        assert_eq!(rect.color(), Color::BLACK);
    }

    #[test]
    fn updates_for_unknown_ids_are_ignored() {
        let (mut registry, mut backend) = setup();
        registry.dispatch(
            &Command::create(ShapeKind::Line, "known", (0.0, 0.0), (1.0, 1.0), Color::WHITE),
            &mut backend,
        );

        for kind in UPDATE_KINDS {
            let command = Command::new(kind, "ghost").with_position(1.0, 1.0);
            assert_eq!(registry.dispatch(&command, &mut backend), Dispatch::Ignored);
        }
        assert_eq!(
            registry.dispatch(&Command::new(CommandKind::Remove, "ghost"), &mut backend),
            Dispatch::Ignored
        );
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("ghost"));
        assert_eq!(backend.live_buffers(), 1);
    }

    #[test]
    fn remove_releases_resources_and_later_updates_are_noops() {
        let (mut registry, mut backend) = setup();
        let create = Command::create(ShapeKind::Image, "img", (0.0, 0.0), (1.0, 1.0), Color::WHITE)
            .with_payload("logo.png");
        registry.dispatch(&create, &mut backend);
        assert_eq!((backend.live_buffers(), backend.live_textures()), (1, 1));

        assert_eq!(
            registry.dispatch(&Command::new(CommandKind::Remove, "img"), &mut backend),
            Dispatch::Removed
        );
        assert_eq!((backend.live_buffers(), backend.live_textures()), (0, 0));

        for kind in UPDATE_KINDS {
            registry.dispatch(&Command::new(kind, "img"), &mut backend);
        }
        assert!(!registry.contains("img"));
        assert!(registry.is_empty());
    }

    #[test]
    fn recreate_after_remove_builds_a_fresh_shape() {
        let (mut registry, mut backend) = setup();
        let create = Command::create(ShapeKind::Ellipse, "e", (0.0, 0.0), (1.0, 1.0), Color::WHITE);
        registry.dispatch(&create, &mut backend);
        registry.dispatch(&Command::new(CommandKind::Remove, "e"), &mut backend);
        assert_eq!(registry.dispatch(&create, &mut backend), Dispatch::Created);
        assert_eq!(backend.live_buffers(), 1);
    }

    #[test]
    fn channel_update_through_dispatch() {
        let (mut registry, mut backend) = setup();
        registry.dispatch(
            &Command::create(ShapeKind::Rect, "r", (0.0, 0.0), (1.0, 1.0), [0.1, 0.2, 0.3, 0.4]),
            &mut backend,
        );
        let command = Command::new(CommandKind::SetChannelAlpha, "r").with_color([0.0, 0.0, 0.0, 1.0]);
        registry.dispatch(&command, &mut backend);

        let color = registry.get("r").unwrap().color();
        assert_eq!(color.alpha(), 1.0);
        assert_eq!(color.channel(Channel::Red), 0.1);
        assert_eq!(color.channel(Channel::Green), 0.2);
        assert_eq!(color.channel(Channel::Blue), 0.3);
    }

    #[test]
    fn iteration_is_in_id_order() {
        let (mut registry, mut backend) = setup();
        for id in ["c", "a", "b"] {
            registry.dispatch(
                &Command::create(ShapeKind::Rect, id, (0.0, 0.0), (1.0, 1.0), Color::WHITE),
                &mut backend,
            );
        }
        let ids: Vec<_> = registry.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn clear_drops_everything() {
        let (mut registry, mut backend) = setup();
        for id in ["a", "b"] {
            registry.dispatch(
                &Command::create(ShapeKind::Rect, id, (0.0, 0.0), (1.0, 1.0), Color::WHITE),
                &mut backend,
            );
        }
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(backend.live_buffers(), 0);
    }
}
