//! World notifications delivered over a channel

use crate::world::persistence::WorldRecord;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum WorldEvent {
    /// Sent once after a world is generated or loaded
    WorldLoaded(Arc<WorldRecord>),
    /// Sent each time a dirty chunk finishes rebuilding
    TerrainUpdated { chunk_id: usize },
}

/// Sending half held by the world. A sink without a sender drops everything.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<WorldEvent>>,
}

impl EventSink {
    pub fn new(sender: Sender<WorldEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Unbounded channel, returns the sink and the subscriber end
    pub fn channel() -> (Self, Receiver<WorldEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: WorldEvent) {
        if let Some(sender) = &self.sender {
            // Nobody listening is fine
            if sender.send(event).is_err() {
                log::trace!("World event dropped, receiver gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_receiver() {
        let (sink, rx) = EventSink::channel();
        sink.emit(WorldEvent::TerrainUpdated { chunk_id: 3 });
        match rx.try_recv() {
            Ok(WorldEvent::TerrainUpdated { chunk_id }) => assert_eq!(chunk_id, 3),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_receiver_is_silent() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(WorldEvent::TerrainUpdated { chunk_id: 0 });
        EventSink::disconnected().emit(WorldEvent::TerrainUpdated { chunk_id: 0 });
    }
}
