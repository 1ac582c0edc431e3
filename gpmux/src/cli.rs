//! Command-line flags. One binary, distinguished by `-l`, serves as both
//! the aggregating server and a controller-sampling client.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "gpmux", about = "Gamepad multiplexing network service")]
pub struct Cli {
    /// Configuration file location.
    #[arg(short = 'c', long = "config", default_value = "configs/gpmux.yml")]
    pub config: String,

    /// Listen as a server rather than connect as a client.
    #[arg(short = 'l', long = "listen")]
    pub listen: bool,

    /// The ip or domain to use.
    #[arg(short = 'd', long = "domain", default_value = "localhost")]
    pub domain: String,

    /// The port to use, for both the TCP control socket and the UDP
    /// datagram socket.
    #[arg(short = 'p', long = "port", default_value_t = 14695)]
    pub port: u16,

    /// The name of the client. Must match `[A-Za-z0-9-]+`.
    #[arg(short = 'n', long = "name", default_value = "client")]
    pub name: String,

    /// Increase verbosity level.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
