//! The concurrent fleet manager: a process-wide `id -> ClientSession` map
//! guarded by a single mutex held across the whole of `reserve`/`release`
//! (spec.md §4.2). Contention is confined to (re)connect events; the
//! multiplexer's hot path never touches this lock.

use std::collections::HashMap;
use std::net::IpAddr;

use tokio::sync::Mutex;

use protocol::ClientRules;

use crate::session::ClientSession;

/// Client ids 0..=254 are assignable; 255 is reserved and never issued.
const MAX_ASSIGNABLE_ID: u8 = 254;

/// Failure modes of [`ClientRegistry::reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    NameTaken,
    /// All 255 assignable ids (`0..=254`) are in use. spec.md §1 treats
    /// more than 256 simultaneous clients as a Non-goal; this surfaces
    /// the boundary as an ordinary handshake failure instead of a panic.
    RegistryFull,
}

#[derive(Default)]
pub struct ClientRegistry {
    sessions: Mutex<HashMap<u8, ClientSession>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the smallest free id in `0..=254` for `name`, or fail with
    /// [`ReserveError::NameTaken`] if any current session already uses
    /// that name, or [`ReserveError::RegistryFull`] if all 255 ids are
    /// in use. Atomic with respect to other `reserve`/`release` calls.
    pub async fn reserve(
        &self,
        name: String,
        control_ip: IpAddr,
        rules: ClientRules,
    ) -> Result<u8, ReserveError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.values().any(|session| session.name == name) {
            return Err(ReserveError::NameTaken);
        }

        let id = (0..=MAX_ASSIGNABLE_ID)
            .find(|candidate| !sessions.contains_key(candidate))
            .ok_or(ReserveError::RegistryFull)?;

        sessions.insert(
            id,
            ClientSession {
                id,
                name,
                control_ip,
                rules,
            },
        );
        Ok(id)
    }

    /// Remove a session. Idempotent.
    pub async fn release(&self, id: u8) {
        self.sessions.lock().await.remove(&id);
    }

    /// Clone out a session's data, if it exists.
    pub async fn lookup(&self, id: u8) -> Option<ClientSession> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// All sessions whose control connection came from `ip`, for binding
    /// a freshly observed UDP source address to a client id.
    pub async fn sessions_with_ip(&self, ip: IpAddr) -> Vec<ClientSession> {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|session| session.control_ip == ip)
            .cloned()
            .collect()
    }

    /// A snapshot of every currently connected client, for the tick loop
    /// to pair against the configured rules.
    pub async fn snapshot(&self) -> Vec<ClientSession> {
        self.sessions.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[tokio::test]
    async fn reserve_assigns_smallest_free_id() {
        let registry = ClientRegistry::new();
        let a = registry.reserve("a".into(), ip(), HashMap::new()).await.unwrap();
        let b = registry.reserve("b".into(), ip(), HashMap::new()).await.unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1);

        registry.release(a).await;
        let c = registry.reserve("c".into(), ip(), HashMap::new()).await.unwrap();
        assert_eq!(c, 0, "a freed id should be reused before allocating a new one");
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let registry = ClientRegistry::new();
        registry.reserve("alice".into(), ip(), HashMap::new()).await.unwrap();
        let result = registry.reserve("alice".into(), ip(), HashMap::new()).await;
        assert_eq!(result, Err(ReserveError::NameTaken));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn full_registry_reports_registry_full_not_a_panic() {
        let registry = ClientRegistry::new();
        for i in 0..=MAX_ASSIGNABLE_ID {
            registry
                .reserve(format!("client-{i}"), ip(), HashMap::new())
                .await
                .unwrap();
        }
        let result = registry.reserve("one-too-many".into(), ip(), HashMap::new()).await;
        assert_eq!(result, Err(ReserveError::RegistryFull));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let registry = ClientRegistry::new();
        registry.release(42).await;
        let id = registry.reserve("a".into(), ip(), HashMap::new()).await.unwrap();
        registry.release(id).await;
        registry.release(id).await;
        assert_eq!(registry.len().await, 0);
    }
}
