//! UDP measurement receiver
//!
//! The controller pushes one measurement datagram per frame. A background
//! reader thread owns the blocking `recv_from` and hands complete
//! datagrams to the caller through a bounded channel; the channel keeps
//! the most recent datagrams and drops the oldest when the caller falls
//! behind, so a slow consumer sees fresh data instead of a growing queue.
//!
//! The same socket is also used for outbound datagrams (stateful-firewall
//! priming, feedback commands), which therefore originate from the local
//! data port as the controller expects.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Channel capacity; a few frames of headroom without buffering stale data
const CHANNEL_CAPACITY: usize = 16;

/// Socket read timeout of the reader thread, bounds shutdown latency
const READER_POLL: Duration = Duration::from_millis(100);

/// One received measurement datagram
#[derive(Debug)]
pub struct Datagram {
    pub payload: Vec<u8>,
    /// Sender of the datagram, fallback target for feedback commands
    pub source: SocketAddr,
}

/// UDP receiver socket with an on-demand background reader
pub struct UdpReceiver {
    socket: Arc<UdpSocket>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    rx: Option<Receiver<Datagram>>,
}

impl UdpReceiver {
    /// Bind the local data port (0 lets the OS choose) and optionally join
    /// a multicast group.
    pub fn bind(port: u16, multicast: Option<Ipv4Addr>) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        if let Some(group) = multicast {
            socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
            log::info!("joined multicast group {}", group);
        }
        log::info!("UDP receiver bound to port {}", socket.local_addr()?.port());

        Ok(Self {
            socket: Arc::new(socket),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
            rx: None,
        })
    }

    /// Local port the receiver is bound to
    pub fn port(&self) -> u16 {
        self.socket.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Start the reader thread if it is not running. `buf_size` must
    /// accommodate the largest datagram the controller emits.
    pub fn start(&mut self, buf_size: usize) -> Result<()> {
        if self.thread.is_some() {
            return Ok(());
        }

        self.socket.set_read_timeout(Some(READER_POLL))?;

        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));
        let socket = Arc::clone(&self.socket);
        let flag = Arc::clone(&running);
        let drain = rx.clone();

        let thread = std::thread::Builder::new()
            .name("drishti-udp-reader".into())
            .spawn(move || reader_loop(socket, flag, tx, drain, buf_size))?;

        self.running = running;
        self.thread = Some(thread);
        self.rx = Some(rx);
        log::debug!("UDP reader started (buffer {} bytes)", buf_size);
        Ok(())
    }

    /// Whether the reader thread is running
    pub fn is_started(&self) -> bool {
        self.thread.is_some()
    }

    /// Wait for the next datagram, up to `timeout`.
    pub fn receive(&self, timeout: Duration) -> Result<Datagram> {
        let rx = self
            .rx
            .as_ref()
            .ok_or_else(|| Error::Net("receiver not started".into()))?;
        recv_datagram(rx, timeout)
    }

    /// Handle to the datagram channel of a started receiver. Lets a caller
    /// block on [`recv_datagram`] without keeping a borrow of the receiver
    /// itself, so a concurrent `terminate` is never locked out.
    pub fn datagrams(&self) -> Option<Receiver<Datagram>> {
        self.rx.clone()
    }

    /// Send one datagram from the local data port.
    pub fn send_to(&self, target: SocketAddr, payload: &[u8]) -> Result<()> {
        self.socket.send_to(payload, target)?;
        Ok(())
    }

    /// Stop the reader thread. Idempotent; a `receive` pending in another
    /// thread returns promptly with a terminated indication.
    pub fn terminate(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("UDP reader thread panicked");
            }
        }
        self.rx = None;
    }
}

impl Drop for UdpReceiver {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Block on a datagram channel obtained from [`UdpReceiver::datagrams`].
pub fn recv_datagram(rx: &Receiver<Datagram>, timeout: Duration) -> Result<Datagram> {
    match rx.recv_timeout(timeout) {
        Ok(datagram) => Ok(datagram),
        Err(RecvTimeoutError::Timeout) => Err(Error::Timeout),
        Err(RecvTimeoutError::Disconnected) => Err(Error::Net("receiver terminated".into())),
    }
}

fn reader_loop(
    socket: Arc<UdpSocket>,
    running: Arc<AtomicBool>,
    tx: Sender<Datagram>,
    drain: Receiver<Datagram>,
    buf_size: usize,
) {
    let mut buffer = vec![0u8; buf_size];

    while running.load(Ordering::Relaxed) {
        let (len, source) = match socket.recv_from(&mut buffer) {
            Ok(result) => result,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                log::error!("UDP recv error: {}", e);
                continue;
            }
        };

        let datagram = Datagram {
            payload: buffer[..len].to_vec(),
            source,
        };

        // latest wins: drop the oldest queued datagram when full
        if let Err(err) = tx.try_send(datagram) {
            let _ = drain.try_recv();
            let _ = tx.try_send(err.into_inner());
            log::trace!("datagram queue full, dropped oldest");
        }
    }

    log::debug!("UDP reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_before_start_is_net_error() {
        let receiver = UdpReceiver::bind(0, None).unwrap();
        assert!(matches!(
            receiver.receive(Duration::from_millis(10)),
            Err(Error::Net(_))
        ));
    }

    #[test]
    fn test_loopback_roundtrip() {
        let mut receiver = UdpReceiver::bind(0, None).unwrap();
        receiver.start(1024).unwrap();
        let target: SocketAddr = ([127, 0, 0, 1], receiver.port()).into();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"fr 1\n", target).unwrap();

        let datagram = receiver.receive(Duration::from_secs(2)).unwrap();
        assert_eq!(datagram.payload, b"fr 1\n");
        assert_eq!(datagram.source.port(), sender.local_addr().unwrap().port());
    }

    #[test]
    fn test_receive_timeout() {
        let mut receiver = UdpReceiver::bind(0, None).unwrap();
        receiver.start(1024).unwrap();
        assert!(matches!(
            receiver.receive(Duration::from_millis(20)),
            Err(Error::Timeout)
        ));
    }

    #[test]
    fn test_terminate_is_idempotent() {
        let mut receiver = UdpReceiver::bind(0, None).unwrap();
        receiver.start(1024).unwrap();
        receiver.terminate();
        receiver.terminate();
        assert!(!receiver.is_started());
    }
}
