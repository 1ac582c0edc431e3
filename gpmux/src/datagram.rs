//! The single owner of the UDP socket: decodes incoming gamepad
//! datagrams, binds each peer address to a registered client, drops
//! stale or malformed packets, and writes accepted samples into the
//! [`StateStore`].
//!
//! Binding and sequence tracking are both plain unlocked `HashMap`s —
//! spec.md §4.4/§5 restrict them to this single task, so no
//! synchronization is needed even though the rest of the server is
//! concurrent.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, warn};

use protocol::{DATAGRAM_LEN, decode_datagram};

use crate::registry::ClientRegistry;
use crate::state_store::{ClientIdentity, StateStore};

pub async fn run(
    socket: UdpSocket,
    registry: Arc<ClientRegistry>,
    store: Arc<StateStore>,
) -> std::io::Result<()> {
    let mut bindings: HashMap<SocketAddr, ClientIdentity> = HashMap::new();
    let mut sequence: HashMap<SocketAddr, u32> = HashMap::new();
    let mut buf = [0u8; 256];

    loop {
        let (len, peer) = socket.recv_from(&mut buf).await?;
        if len != DATAGRAM_LEN {
            debug!(%peer, len, "dropping datagram of unexpected length");
            continue;
        }

        let (packet_id, controller_index, state) = match decode_datagram(&buf[..len]) {
            Ok(decoded) => decoded,
            Err(error) => {
                debug!(%peer, %error, "dropping malformed datagram");
                continue;
            }
        };

        if is_stale(&mut sequence, peer, packet_id) {
            debug!(%peer, packet_id, "dropping stale datagram");
            continue;
        }

        if !bindings.contains_key(&peer) {
            let resolved = resolve_binding(&registry, peer).await;
            bindings.insert(peer, resolved);
        }
        let identity = *bindings.get(&peer).expect("just inserted if missing");

        store.update((identity, controller_index), state).await;
    }
}

/// spec.md §4.4's per-peer staleness check: a packet whose id is not
/// strictly greater than the last accepted id from `peer` is stale and
/// must be dropped without updating the tracker. Accepting a packet
/// records its id as the new high-water mark. A wrapped-around id
/// (e.g. `0` arriving after `0xFFFFFFFF`) is, per spec.md §9, just an
/// ordinary low id arriving after a high one — stale, with no special
/// reset.
fn is_stale(sequence: &mut HashMap<SocketAddr, u32>, peer: SocketAddr, packet_id: u32) -> bool {
    if let Some(&last) = sequence.get(&peer) {
        if packet_id <= last {
            return true;
        }
    }
    sequence.insert(peer, packet_id);
    false
}

/// The first datagram from a new address is bound to the registered
/// client whose control-connection peer IP matches it. An address
/// matching no client's control IP is still applied — under
/// [`ClientIdentity::Unbound`] — rather than dropped, so an
/// unauthenticated sender shows up in the state store (and in logs
/// below) instead of vanishing silently, without ever being able to
/// collide with a real client's entries.
async fn resolve_binding(registry: &ClientRegistry, peer: SocketAddr) -> ClientIdentity {
    let candidates = registry.sessions_with_ip(peer.ip()).await;
    match candidates.as_slice() {
        [session] => {
            debug!(%peer, client_id = session.id, name = %session.name, "bound datagram source");
            ClientIdentity::Registered(session.id)
        }
        [] => {
            warn!(%peer, "datagram source matches no registered client's control connection");
            ClientIdentity::Unbound(peer)
        }
        _ => {
            warn!(
                %peer,
                candidates = candidates.len(),
                "datagram source matches multiple clients on the same IP; binding to the lowest id"
            );
            let lowest = candidates.iter().map(|session| session.id).min().unwrap();
            ClientIdentity::Registered(lowest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[tokio::test]
    async fn resolves_to_the_sole_matching_client() {
        let registry = ClientRegistry::new();
        let id = registry
            .reserve("alice".into(), peer(1).ip(), StdHashMap::new())
            .await
            .unwrap();

        let binding = resolve_binding(&registry, peer(1)).await;
        assert!(matches!(binding, ClientIdentity::Registered(bound) if bound == id));
    }

    #[tokio::test]
    async fn unmatched_address_is_unbound_not_dropped() {
        let registry = ClientRegistry::new();
        let binding = resolve_binding(&registry, peer(9999)).await;
        assert!(matches!(binding, ClientIdentity::Unbound(_)));
    }

    #[test]
    fn scenario_5_stale_packet_does_not_overwrite_a_newer_one() {
        let mut sequence = HashMap::new();
        let source = peer(1);

        assert!(!is_stale(&mut sequence, source, 1));
        assert!(!is_stale(&mut sequence, source, 3));
        assert!(
            is_stale(&mut sequence, source, 2),
            "id 2 arriving after id 3 must be dropped as stale"
        );
    }

    #[test]
    fn packet_id_wraparound_is_treated_as_stale_not_reset() {
        let mut sequence = HashMap::new();
        let source = peer(1);

        assert!(!is_stale(&mut sequence, source, u32::MAX));
        assert!(
            is_stale(&mut sequence, source, 0),
            "a wrapped-around low id after a high one is stale per spec.md §9"
        );
    }

    #[test]
    fn distinct_peers_track_sequence_independently() {
        let mut sequence = HashMap::new();
        assert!(!is_stale(&mut sequence, peer(1), 5));
        assert!(!is_stale(&mut sequence, peer(2), 1));
    }
}
