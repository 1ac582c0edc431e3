//! Shared state between datagram ingestion (writer) and the tick loop
//! (reader): the most recent gamepad sample per contributing identity and
//! controller index. See `SPEC_FULL.md` §9 for why the key carries client
//! identity rather than the controller index alone.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::RwLock;

use protocol::GamepadState;

/// Who a `(_, controller_index)` reading in the store is attributed to:
/// a registered client's id, or — when a datagram's source address
/// matches no client's control connection — the raw peer address.
/// `Unbound` stays a distinct variant rather than being folded into a
/// `u8` bucket, so an unauthenticated sender's address can never
/// collide with (and silently overwrite) a real client's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    Registered(u8),
    Unbound(SocketAddr),
}

/// `(identity, controller_index)` identifies one contributing
/// controller.
pub type StoreKey = (ClientIdentity, u8);

#[derive(Default)]
pub struct StateStore {
    entries: RwLock<HashMap<StoreKey, GamepadState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the entry for `key` with the latest accepted state.
    pub async fn update(&self, key: StoreKey, state: GamepadState) {
        self.entries.write().await.insert(key, state);
    }

    /// A read-locked copy of every entry, for one multiplexer tick.
    pub async fn snapshot(&self) -> HashMap<StoreKey, GamepadState> {
        self.entries.read().await.clone()
    }
}
