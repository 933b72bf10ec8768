//! TCP command stream
//!
//! One persistent connection to the controller's command port. Commands
//! and replies are single ASCII strings terminated by NUL; replies are
//! bounded by the protocol's maximum command length. The exchange is
//! strictly request/reply, serialized by the session facade.

use crate::protocol::{ResponseClass, MAX_COMMAND_LEN};
use crate::error::Result;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

pub struct CommandStream {
    stream: TcpStream,
    /// Set on any socket failure; a dead stream never carries commands again
    dead: bool,
}

impl CommandStream {
    /// Connect to the controller's command port.
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        log::info!("command stream connected to {}", addr);
        Ok(Self {
            stream,
            dead: false,
        })
    }

    /// Whether the stream has not seen a fatal socket error yet
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Send one command and wait for its reply.
    ///
    /// The command is NUL-terminated on the wire (a terminator already
    /// present is kept). Oversized commands are refused before any byte is
    /// written. A timeout leaves the stream usable; any socket failure
    /// marks it dead.
    pub fn exchange(&mut self, command: &str, timeout: Duration) -> ResponseClass {
        if self.dead {
            return ResponseClass::Transport;
        }
        if command.len() > MAX_COMMAND_LEN {
            return ResponseClass::TooLong;
        }

        let mut wire = Vec::with_capacity(command.len() + 1);
        wire.extend_from_slice(command.as_bytes());
        if wire.last() != Some(&0) {
            wire.push(0);
        }

        if self.stream.set_write_timeout(Some(timeout)).is_err() {
            self.dead = true;
            return ResponseClass::Transport;
        }
        if self.stream.write_all(&wire).and_then(|_| self.stream.flush()).is_err() {
            log::warn!("command stream write failed, marking dead");
            self.dead = true;
            return ResponseClass::Transport;
        }

        match self.read_reply(timeout) {
            Ok(Some(reply)) => ResponseClass::classify(&reply),
            Ok(None) => ResponseClass::Timeout,
            Err(_) => {
                log::warn!("command stream read failed, marking dead");
                self.dead = true;
                ResponseClass::Transport
            }
        }
    }

    /// Read bytes until NUL, the protocol length bound or the deadline.
    /// `Ok(None)` is a timeout; `Err` is a dead socket.
    fn read_reply(&mut self, timeout: Duration) -> std::io::Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        let mut reply = Vec::with_capacity(MAX_COMMAND_LEN);
        let mut chunk = [0u8; 64];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.stream.set_read_timeout(Some(remaining))?;

            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    // peer closed the session
                    return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
                }
                Ok(n) => {
                    reply.extend_from_slice(&chunk[..n]);
                    if reply.contains(&0) || reply.len() >= MAX_COMMAND_LEN {
                        let end = reply.iter().position(|&b| b == 0).unwrap_or(reply.len());
                        reply.truncate(end);
                        return Ok(Some(String::from_utf8_lossy(&reply).into_owned()));
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }
}
