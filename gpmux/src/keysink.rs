//! The tick loop's output collaborator: synthesizes keyboard events
//! from virtual-gamepad transitions. Real key synthesis is
//! platform-specific and out of scope; [`LoggingKeySink`] exists only
//! so the binary runs end to end without one.

use tracing::info;

pub trait KeySink: Send + Sync {
    fn key_down(&self, key: &str);
    fn key_up(&self, key: &str);
}

#[derive(Default)]
pub struct LoggingKeySink;

impl KeySink for LoggingKeySink {
    fn key_down(&self, key: &str) {
        info!(key, "key down");
    }

    fn key_up(&self, key: &str) {
        info!(key, "key up");
    }
}
