//! UDP transport implementation
//!
//! One socket per session: bound on the feedback port, sending commands to
//! the device's target address. Receiving runs on a spawned task feeding an
//! mpsc channel so the session loop owns its own pacing.

use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::{Result, TransportError};
use crate::traits::{TransportEvent, TransportReceiver, TransportSender};

/// Maximum UDP payload we ever expect from the device
const RECV_BUFFER_SIZE: usize = 65536;

/// UDP transport (connectionless)
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind to a local address (the feedback port)
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TransportError::BindFailed(e.to_string()))?;

        debug!("udp bound to {}", socket.local_addr()?);

        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// Local address after binding
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(TransportError::Io)
    }

    /// Sender pinned to the device's command address
    pub fn sender_to(&self, remote: SocketAddr) -> UdpSender {
        UdpSender {
            socket: self.socket.clone(),
            remote,
        }
    }

    /// Spawn the receive task. Every datagram payload is forwarded with its
    /// source address; the task ends when the receiver is dropped.
    pub fn start_receiver(&self) -> UdpReceiver {
        let (tx, rx) = mpsc::channel(100);
        let socket = self.socket.clone();

        tokio::spawn(async move {
            let mut buf = vec![0u8; RECV_BUFFER_SIZE];

            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, from)) => {
                        debug!("udp received {} bytes from {}", len, from);
                        let data = Bytes::copy_from_slice(&buf[..len]);
                        if tx.send((TransportEvent::Data(data), from)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("udp receive error: {}", e);
                        if tx
                            .send((
                                TransportEvent::Error(e.to_string()),
                                SocketAddr::from(([0, 0, 0, 0], 0)),
                            ))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        });

        UdpReceiver { rx }
    }

    /// One-off send to an arbitrary address
    pub async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        self.socket
            .send_to(data, target)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(())
    }
}

/// UDP sender pinned to the device's command address
#[derive(Clone)]
pub struct UdpSender {
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
}

#[async_trait]
impl TransportSender for UdpSender {
    async fn send(&self, data: Bytes) -> Result<()> {
        self.socket
            .send_to(&data, self.remote)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(())
    }
}

/// UDP receiver
pub struct UdpReceiver {
    rx: mpsc::Receiver<(TransportEvent, SocketAddr)>,
}

impl UdpReceiver {
    /// Receive the next event with its source address
    pub async fn recv_from(&mut self) -> Option<(TransportEvent, SocketAddr)> {
        self.rx.recv().await
    }
}

#[async_trait]
impl TransportReceiver for UdpReceiver {
    async fn recv(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await.map(|(event, _)| event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_bind_ephemeral() {
        let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert!(transport.local_addr().unwrap().port() > 0);
    }

    #[tokio::test]
    async fn test_udp_send_recv() {
        let device = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let adapter = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        let mut receiver = device.start_receiver();

        let sender = adapter.sender_to(device.local_addr().unwrap());
        sender.send(Bytes::from_static(b"/ping\0\0\0,\0\0\0")).await.unwrap();

        let (event, from) = receiver.recv_from().await.unwrap();
        match event {
            TransportEvent::Data(data) => assert_eq!(data.as_ref(), b"/ping\0\0\0,\0\0\0"),
            _ => panic!("expected data event"),
        }
        assert_eq!(from.port(), adapter.local_addr().unwrap().port());
    }
}
