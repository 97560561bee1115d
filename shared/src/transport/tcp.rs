use std::{
    io::{ErrorKind, Read, Write},
    net::{Shutdown, SocketAddr, TcpListener, TcpStream},
};

use log::{debug, info, warn};

use super::{error::TransportError, Link, PacketReceiver, PacketSender};
use crate::{connection::connection_config::ConnectionConfig, sync::shutdown::ShutdownSignal};

/// TCP transport. Nagle's algorithm is disabled since every frame is latency bound.
pub struct TcpLink;

impl TcpLink {
    /// Wrap an established stream
    pub fn from_stream(stream: TcpStream, config: &ConnectionConfig) -> Result<Link, TransportError> {
        let peer = stream
            .peer_addr()
            .map(|address| address.to_string())
            .unwrap_or_else(|_| "unknown peer".to_string());
        let io_error = |error: std::io::Error| TransportError::io(&peer, &error);

        stream.set_nonblocking(false).map_err(io_error)?;
        stream.set_nodelay(true).map_err(io_error)?;
        stream
            .set_read_timeout(Some(config.read_poll_interval))
            .map_err(io_error)?;
        let read_stream = stream.try_clone().map_err(io_error)?;

        Ok(Link {
            peer: peer.clone(),
            sender: Box::new(TcpSender {
                stream,
                peer: peer.clone(),
                closed: false,
            }),
            receiver: Box::new(TcpReceiver {
                stream: read_stream,
                peer,
                buffer: vec![0; config.read_buffer_size.max(1)],
            }),
        })
    }

    /// Connect to the master, retrying until it accepts, the attempt limit is
    /// reached, or shutdown is requested
    pub fn connect(
        address: SocketAddr,
        config: &ConnectionConfig,
        shutdown: &ShutdownSignal,
    ) -> Result<Link, TransportError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            debug!("Attempting to connect to master at {} (attempt {})", address, attempts);
            match TcpStream::connect(address) {
                Ok(stream) => {
                    info!("Connected to master at {}", address);
                    return Self::from_stream(stream, config);
                }
                Err(error) => {
                    debug!("Connection to {} failed: {}", address, error);
                }
            }

            if let Some(max) = config.max_connect_attempts {
                if attempts >= max {
                    warn!("Giving up on master at {} after {} attempts", address, attempts);
                    return Err(TransportError::ConnectFailed { address, attempts });
                }
            }
            if shutdown.wait_timeout(config.connect_retry_interval) {
                return Err(TransportError::ConnectFailed { address, attempts });
            }
        }
    }
}

struct TcpSender {
    stream: TcpStream,
    peer: String,
    closed: bool,
}

impl PacketSender for TcpSender {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed {
                peer: self.peer.clone(),
            });
        }
        self.stream
            .write_all(payload)
            .map_err(|error| TransportError::io(&self.peer, &error))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            // The peer may already be gone
            let _ = self.stream.shutdown(Shutdown::Both);
        }
    }
}

struct TcpReceiver {
    stream: TcpStream,
    peer: String,
    buffer: Vec<u8>,
}

impl PacketReceiver for TcpReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError> {
        match self.stream.read(&mut self.buffer) {
            Ok(0) => Err(TransportError::Closed {
                peer: self.peer.clone(),
            }),
            Ok(count) => Ok(Some(&self.buffer[..count])),
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(error) => Err(TransportError::io(&self.peer, &error)),
        }
    }
}

/// Listening socket on the master. Accepting never blocks, so the master can
/// poll for new or returning clients once per frame.
pub struct TcpAcceptor {
    listener: TcpListener,
    address: SocketAddr,
}

impl TcpAcceptor {
    pub fn bind(address: SocketAddr) -> Result<Self, TransportError> {
        let bind_error = |error: std::io::Error| TransportError::Bind {
            address,
            message: error.to_string(),
        };
        let listener = TcpListener::bind(address).map_err(bind_error)?;
        listener.set_nonblocking(true).map_err(bind_error)?;
        let address = listener.local_addr().map_err(bind_error)?;
        info!("Master listening on {}", address);
        Ok(Self { listener, address })
    }

    /// The bound address, useful when binding port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    pub fn accept(&self, config: &ConnectionConfig) -> Result<Option<Link>, TransportError> {
        match self.listener.accept() {
            Ok((stream, address)) => {
                info!("Accepted connection from {}", address);
                TcpLink::from_stream(stream, config).map(Some)
            }
            Err(error) if error.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(TransportError::io(&self.address.to_string(), &error)),
        }
    }
}
