//! TCP peer connection
//!
//! A session talks to exactly one peer, either accepted on a listening
//! socket or connected to directly. Each direction gets its own handle to
//! the socket; only the coordinator closes it.

use crate::error::{NetcopyError, Result};
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

/// Listening socket that hands out a single peer
pub struct PeerListener {
    /// Listener
    listener: TcpListener,
    /// Address as given on the command line
    addr: String,
}

impl PeerListener {
    /// Bind a listening socket
    pub fn bind(addr: &str) -> Result<Self> {
        tracing::info!("Listening on {}...", addr);
        let listener = TcpListener::bind(addr).map_err(|source| NetcopyError::Listen {
            addr: addr.to_string(),
            source,
        })?;

        Ok(Self {
            listener,
            addr: addr.to_string(),
        })
    }

    /// Get the bound address
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept one peer and stop listening
    pub fn accept(self) -> Result<PeerConnection> {
        let (stream, _) = self.listener.accept().map_err(|source| NetcopyError::Accept {
            addr: self.addr.clone(),
            source,
        })?;

        let conn = PeerConnection::from_stream(stream);
        tracing::info!("Accepted from {}", conn.peer_addr());
        Ok(conn)
    }
}

/// The one TCP connection of a session
#[derive(Debug)]
pub struct PeerConnection {
    /// Connection stream
    stream: TcpStream,
    /// Remote address, for messages
    peer: String,
}

impl PeerConnection {
    /// Connect to a peer
    pub fn connect(addr: &str) -> Result<Self> {
        tracing::info!("Connecting to {}...", addr);
        let stream = TcpStream::connect(addr).map_err(|source| NetcopyError::Connect {
            addr: addr.to_string(),
            source,
        })?;

        let conn = Self::from_stream(stream);
        tracing::info!("Connected to {}", conn.peer_addr());
        Ok(conn)
    }

    /// Listen on `addr` and accept exactly one peer
    pub fn listen_and_accept(addr: &str) -> Result<Self> {
        PeerListener::bind(addr)?.accept()
    }

    /// Wrap an already established stream
    pub fn from_stream(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Self { stream, peer }
    }

    /// Remote address as a string
    pub fn peer_addr(&self) -> &str {
        &self.peer
    }

    /// Handle for reading from the peer
    pub fn reader(&self) -> io::Result<TcpStream> {
        self.stream.try_clone()
    }

    /// Handle for writing to the peer
    pub fn writer(&self) -> io::Result<TcpStream> {
        self.stream.try_clone()
    }

    /// Shut the connection down in both directions
    pub fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // The peer may already be gone
            tracing::debug!("Shutdown of {} failed: {}", self.peer, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::thread;

    #[test]
    fn test_accept_and_exchange() {
        let listener = PeerListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let conn = PeerConnection::connect(&addr.to_string()).unwrap();
            assert_eq!(conn.peer_addr(), addr.to_string());
            conn.writer().unwrap().write_all(b"ping").unwrap();
            conn.close();
        });

        let conn = listener.accept().unwrap();
        let mut received = Vec::new();
        conn.reader().unwrap().read_to_end(&mut received).unwrap();
        client.join().unwrap();

        assert_eq!(received, b"ping");
        assert!(conn.peer_addr().starts_with("127.0.0.1:"));
        conn.close();
    }

    #[test]
    fn test_connect_refused() {
        // Grab a free port, then release it so nothing is listening
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = PeerConnection::connect(&addr.to_string()).unwrap_err();
        assert!(matches!(err, NetcopyError::Connect { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_bind_bad_address() {
        let err = PeerListener::bind("not an address").err().unwrap();
        assert!(matches!(err, NetcopyError::Listen { .. }));
        assert!(err.to_string().starts_with("Can't listen on not an address: "));
    }
}
