//! Tunnel setup seam.
//!
//! The transport mechanics of the tunnel (key exchange, channel encryption)
//! live outside this crate. The registry only needs one capability: given key
//! material and a login identity, open a local forwarding endpoint for a
//! remote host:port, or fail. Implementations plug in through
//! [`TunnelProvider`]; the returned [`TunnelHandle`] owns the forwarding
//! endpoint and tears it down on drop.

use crate::config::TunnelConfig;
use crate::error::DbResult;

/// A live forwarding endpoint. Dropping the handle closes the tunnel.
pub trait TunnelHandle: Send + Sync {
    /// Local port the forwarded connection is reachable on.
    fn local_port(&self) -> u16;
}

/// Opens forwarding tunnels for the registry.
pub trait TunnelProvider: Send + Sync {
    /// Open a forwarding endpoint on `config.local_port` that carries traffic
    /// to `remote_host:remote_port`.
    ///
    /// This is a one-shot blocking network operation performed during
    /// registration. A failure surfaces as [`DbError::Tunnel`] and is never
    /// retried by the registry; the caller decides whether to try again.
    ///
    /// [`DbError::Tunnel`]: crate::error::DbError::Tunnel
    fn open(
        &self,
        remote_host: &str,
        remote_port: u16,
        config: &TunnelConfig,
    ) -> DbResult<Box<dyn TunnelHandle>>;
}
