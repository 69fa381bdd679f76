//! LAN address detection
//!
//! The speaker fetches artifacts over plain HTTP, so the gateway must hand it
//! a URL built from an address that is reachable on the local network.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Determine this machine's LAN IP address.
///
/// Connects a UDP socket toward a public address and reads back the local
/// socket name. No packet is sent; the OS just picks the outbound interface.
/// Falls back to loopback when no route exists.
#[must_use]
pub fn local_ip() -> IpAddr {
    let fallback = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let Ok(socket) = UdpSocket::bind(("0.0.0.0", 0)) else {
        return fallback;
    };
    if socket.connect(("8.8.8.8", 80)).is_err() {
        return fallback;
    }
    socket.local_addr().map_or(fallback, |addr| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_ip_is_not_unspecified() {
        let ip = local_ip();
        assert!(!ip.is_unspecified());
    }
}
