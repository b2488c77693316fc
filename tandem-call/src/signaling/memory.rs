use crate::error::SignalingError;
use crate::signaling::channel::SignalingChannel;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::model::{ClientEvent, RoomName, ServerEvent, SignalMessage};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use uuid::Uuid;

const ROOM_CAPACITY: usize = 2;

struct Member {
    id: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

#[derive(Default)]
struct RoomSlot {
    members: Vec<Member>,
}

/// In-process relay wiring sessions directly to each other.
///
/// It carries the membership and forwarding semantics the engine
/// expects from a real relay: two seats per room, a third join attempt
/// answered with `full`, call events and messages forwarded to the
/// other seat only, per-sender delivery order preserved. Routed call
/// payloads are additionally recorded for inspection in tests.
pub struct MemoryRelay {
    rooms: DashMap<RoomName, RoomSlot>,
    routed: Mutex<Vec<(RoomName, SignalMessage)>>,
}

impl MemoryRelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            routed: Mutex::new(Vec::new()),
        })
    }

    /// One client end plus its inbound event stream.
    pub fn open(self: &Arc<Self>) -> (MemoryChannel, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = MemoryChannel {
            relay: self.clone(),
            member: Uuid::new_v4(),
            tx,
        };
        (channel, rx)
    }

    /// Every `message` payload routed through the given room so far.
    pub async fn routed_signals(&self, room: &RoomName) -> Vec<SignalMessage> {
        self.routed
            .lock()
            .await
            .iter()
            .filter(|(r, _)| r == room)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn member_count(&self, room: &RoomName) -> usize {
        self.rooms.get(room).map_or(0, |slot| slot.members.len())
    }

    async fn dispatch(
        &self,
        member: Uuid,
        member_tx: &mpsc::UnboundedSender<ServerEvent>,
        room: &RoomName,
        event: ClientEvent,
    ) -> Result<(), SignalingError> {
        match event {
            ClientEvent::CreateOrJoin => self.join(member, member_tx, room),
            ClientEvent::CallInitiated { caller } => {
                self.forward(member, room, ServerEvent::CallInitiated { caller })
            }
            ClientEvent::CallAccepted { callee } => {
                self.forward(member, room, ServerEvent::CallAccepted { callee })
            }
            ClientEvent::CallRejected => self.forward(member, room, ServerEvent::CallRejected),
            ClientEvent::Message { payload } => {
                self.routed
                    .lock()
                    .await
                    .push((room.clone(), payload.clone()));
                self.forward(member, room, ServerEvent::Message { payload })
            }
            ClientEvent::LeaveRoom => {
                self.leave(member, room);
                Ok(())
            }
        }
    }

    fn join(
        &self,
        member: Uuid,
        member_tx: &mpsc::UnboundedSender<ServerEvent>,
        room: &RoomName,
    ) -> Result<(), SignalingError> {
        let mut slot = self.rooms.entry(room.clone()).or_default();

        if slot.members.iter().any(|m| m.id == member) {
            // A seat holder asking again, e.g. a session rejoining
            // after a rejected call. Replay the membership event that
            // matches the current occupancy.
            if slot.members.len() < ROOM_CAPACITY {
                let _ = member_tx.send(ServerEvent::Created);
            } else {
                for m in &slot.members {
                    let _ = m.tx.send(ServerEvent::Joined);
                }
            }
            return Ok(());
        }

        if slot.members.len() >= ROOM_CAPACITY {
            debug!("Room '{}' is full, turning member away", room);
            let _ = member_tx.send(ServerEvent::Full);
            return Ok(());
        }

        slot.members.push(Member {
            id: member,
            tx: member_tx.clone(),
        });

        if slot.members.len() == 1 {
            let _ = member_tx.send(ServerEvent::Created);
        } else {
            for m in &slot.members {
                let _ = m.tx.send(ServerEvent::Joined);
            }
        }
        Ok(())
    }

    fn forward(
        &self,
        sender: Uuid,
        room: &RoomName,
        event: ServerEvent,
    ) -> Result<(), SignalingError> {
        let Some(slot) = self.rooms.get(room) else {
            debug!("Dropping event for unknown room '{}'", room);
            return Ok(());
        };
        for m in slot.members.iter().filter(|m| m.id != sender) {
            let _ = m.tx.send(event.clone());
        }
        Ok(())
    }

    fn leave(&self, member: Uuid, room: &RoomName) {
        let emptied = {
            let Some(mut slot) = self.rooms.get_mut(room) else {
                return;
            };
            slot.members.retain(|m| m.id != member);
            slot.members.is_empty()
        };
        if emptied {
            self.rooms.remove(room);
        }
    }
}

/// One client end of a [`MemoryRelay`].
pub struct MemoryChannel {
    relay: Arc<MemoryRelay>,
    member: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

#[async_trait]
impl SignalingChannel for MemoryChannel {
    async fn send(&self, room: &RoomName, event: ClientEvent) -> Result<(), SignalingError> {
        self.relay.dispatch(self.member, &self.tx, room, event).await
    }
}
