//! A registered client's session data: `(id, name, control-channel peer,
//! rules)` per spec.md §3. The live `TcpStream` itself is owned by the
//! connection task (`handshake.rs`), not stored here — nothing outside
//! that task ever needs to write to the control channel again once the
//! handshake completes.

use std::net::IpAddr;

use protocol::ClientRules;

#[derive(Debug, Clone)]
pub struct ClientSession {
    pub id: u8,
    pub name: String,
    /// IP address of the client's control (TCP) connection. Used to bind
    /// an incoming UDP datagram's source address to a client id — see
    /// `datagram.rs`.
    pub control_ip: IpAddr,
    pub rules: ClientRules,
}
