use crate::frame::Frame;

/// An event tagged with the frame it was emitted in.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<E> {
    pub frame_index: u64,
    pub event: E,
}

/// Ordered, frame-stamped event queue.
///
/// Producers push during a tick; the presentation layer drains once per frame.
/// Emission order is preserved, which is what keeps overlay updates for one
/// selection from interleaving with the next.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Stamped<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, event: E) {
        self.events.push(Stamped {
            frame_index: frame.index,
            event,
        });
    }

    pub fn events(&self) -> &[Stamped<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn drain(&mut self) -> Vec<Stamped<E>> {
        std::mem::take(&mut self.events)
    }

    /// Drain and drop the frame stamps.
    pub fn drain_events(&mut self) -> Vec<E> {
        self.drain().into_iter().map(|s| s.event).collect()
    }
}
