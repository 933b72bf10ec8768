//! DrishtiIO - session facade for one tracking controller
//!
//! Owns the UDP measurement receiver, the optional TCP command session and
//! all per-session state: the current frame, the two channel error codes
//! and the most recent controller-reported error and event message.
//!
//! # Concurrency
//!
//! The facade is meant to be driven by one caller, but all methods take
//! `&self`: frames are published through a read-copy-update pointer, so a
//! reader never observes a half-replaced frame, and commands are
//! serialized by a lock around the TCP stream. A `receive` pending in one
//! thread never locks out `stop_measurement` or `close` in another.

use crate::config::{Connection, Settings, DEFAULT_COMMAND_TIMEOUT_US, DEFAULT_DATA_TIMEOUT_US, DEFAULT_DATA_BUFFER_SIZE};
use crate::error::{Error, ErrorKind, Result};
use crate::feedback;
use crate::parser::parse_frame;
use crate::protocol::{
    match_parameter_echo, EventMessage, ResponseClass, FIREWALL_TOKEN, PORT_COMMAND,
    PORT_FEEDBACK, PORT_UDP_SENDER,
};
use crate::transport::{recv_datagram, CommandStream, UdpReceiver};
use crate::types::Frame;
use parking_lot::{Mutex, RwLock};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

/// Session facade for one tracking controller
///
/// # Examples
///
/// ## Pure listening
///
/// ```no_run
/// use drishti_io::DrishtiIO;
///
/// # fn main() -> drishti_io::Result<()> {
/// let dt = DrishtiIO::new("5000")?;
/// dt.start_measurement()?;
///
/// loop {
///     match dt.receive() {
///         Ok(frame) => println!("frame {}: {} bodies", frame.frame_counter, frame.num_bodies()),
///         Err(e) => log::warn!("no frame: {}", e),
///     }
/// }
/// # }
/// ```
///
/// ## Communicating mode
///
/// ```no_run
/// use drishti_io::DrishtiIO;
///
/// # fn main() -> drishti_io::Result<()> {
/// let dt = DrishtiIO::new("192.168.0.1:5000")?;
/// if !dt.is_command_interface_full_access() {
///     eprintln!("controller front-end still holds exclusive access");
/// }
/// dt.start_measurement()?;
/// let frame = dt.receive()?;
/// dt.stop_measurement()?;
/// # Ok(())
/// # }
/// ```
pub struct DrishtiIO {
    settings: Mutex<Settings>,

    udp: Mutex<Option<UdpReceiver>>,
    tcp: Mutex<Option<CommandStream>>,

    /// Controller address, known only in communicating mode
    controller_ip: Option<IpAddr>,
    /// Target of the stateful-firewall priming packet
    udp_sender: Mutex<Option<SocketAddr>>,
    /// Source of the most recent measurement datagram, fallback target
    /// for feedback commands
    last_source: Mutex<Option<SocketAddr>>,

    frame: RwLock<Arc<Frame>>,
    last_buffer: Mutex<String>,

    last_data_error: Mutex<ErrorKind>,
    last_server_error: Mutex<ErrorKind>,
    last_dtrack_error: Mutex<(i32, String)>,
    last_message: Mutex<EventMessage>,
}

impl DrishtiIO {
    /// Universal constructor over the connection-string grammar:
    ///
    /// - `"5000"` : pure listening mode
    /// - `"224.0.1.0:5000"` : multicast listening mode
    /// - `"atc-301422002:5000"` : communicating mode (opens TCP)
    /// - `"192.168.0.1:5000:fw"` : listening mode behind a stateful firewall
    ///
    /// Fails if the connection string is invalid, the host cannot be
    /// resolved or the data port cannot be bound. A controller whose
    /// command port does not answer leaves the command interface invalid
    /// but the constructor succeeds, like a pure listening session.
    pub fn new(connection: &str) -> Result<Self> {
        Self::with_settings(connection, Settings::default())
    }

    /// Like [`DrishtiIO::new`] with explicit timeouts and buffer size.
    pub fn with_settings(connection: &str, settings: Settings) -> Result<Self> {
        let connection: Connection = connection.parse()?;

        match connection {
            Connection::Listen { port } => Self::build(port, None, None, false, settings),
            Connection::Multicast { group, port } => {
                Self::build(port, Some(group), None, false, settings)
            }
            Connection::Controller { host, port } => {
                let ip = resolve_host(&host)?;
                Self::build(port, None, Some(ip), true, settings)
            }
            Connection::ControllerFw { host, port } => {
                let ip = resolve_host(&host)?;
                Self::build(port, None, Some(ip), false, settings)
            }
        }
    }

    /// Pure listening mode on a local data port (0 = chosen by the OS).
    pub fn listen(data_port: u16) -> Result<Self> {
        Self::build(data_port, None, None, false, Settings::default())
    }

    /// Multicast listening mode.
    pub fn multicast(group: std::net::Ipv4Addr, data_port: u16) -> Result<Self> {
        Self::build(data_port, Some(group), None, false, Settings::default())
    }

    /// Communicating mode: opens the TCP command session to the
    /// controller.
    pub fn communicating(controller_host: &str, data_port: u16) -> Result<Self> {
        let ip = resolve_host(controller_host)?;
        Self::build(data_port, None, Some(ip), true, Settings::default())
    }

    fn build(
        data_port: u16,
        multicast: Option<std::net::Ipv4Addr>,
        controller: Option<IpAddr>,
        open_tcp: bool,
        settings: Settings,
    ) -> Result<Self> {
        let udp = UdpReceiver::bind(data_port, multicast)?;

        let sdk = Self {
            settings: Mutex::new(settings),
            udp: Mutex::new(Some(udp)),
            tcp: Mutex::new(None),
            controller_ip: if open_tcp { controller } else { None },
            udp_sender: Mutex::new(
                controller.map(|ip| SocketAddr::new(ip, PORT_UDP_SENDER)),
            ),
            last_source: Mutex::new(None),
            frame: RwLock::new(Arc::new(Frame::default())),
            last_buffer: Mutex::new(String::new()),
            last_data_error: Mutex::new(ErrorKind::None),
            last_server_error: Mutex::new(ErrorKind::None),
            last_dtrack_error: Mutex::new((0, String::new())),
            last_message: Mutex::new(EventMessage::default()),
        };

        if let (true, Some(ip)) = (open_tcp, controller) {
            let addr = SocketAddr::new(ip, PORT_COMMAND);
            match CommandStream::connect(addr, settings.command_timeout()) {
                Ok(stream) => *sdk.tcp.lock() = Some(stream),
                Err(e) => log::error!("command port on {} is not reachable: {}", ip, e),
            }
        }

        // enable inbound measurement data through a stateful firewall at once
        if controller.is_some() {
            sdk.send_firewall_packet();
        }

        Ok(sdk)
    }

    // -----------------------------------------------------------------
    // interface validity
    // -----------------------------------------------------------------

    /// Whether construction delivered everything the chosen mode needs:
    /// the data interface, and for communicating mode also a command
    /// interface with full access.
    pub fn is_valid(&self) -> bool {
        if !self.is_data_interface_valid() {
            return false;
        }
        if self.controller_ip.is_some() {
            return self.is_command_interface_full_access();
        }
        true
    }

    /// Whether the UDP socket for tracking data is open. Does not
    /// guarantee that any data is sent to this port.
    pub fn is_data_interface_valid(&self) -> bool {
        self.udp.lock().is_some()
    }

    /// Whether the TCP session for `dtrack2` commands is usable.
    pub fn is_command_interface_valid(&self) -> bool {
        self.tcp.lock().as_ref().map_or(false, CommandStream::is_alive)
    }

    /// Whether the command session has full access. `"monitor"` access
    /// means the controller's own front-end still holds exclusive access.
    pub fn is_command_interface_full_access(&self) -> bool {
        if !self.is_command_interface_valid() {
            return false;
        }
        self.get_param("system", "access").as_deref() == Some("full")
    }

    /// Local UDP port tracking data is received on, 0 if closed.
    pub fn data_port(&self) -> u16 {
        self.udp.lock().as_ref().map_or(0, UdpReceiver::port)
    }

    // -----------------------------------------------------------------
    // settings
    // -----------------------------------------------------------------

    /// Set the UDP timeout for receiving tracking data (us; 0 restores
    /// the 1.0 s default).
    pub fn set_data_timeout_us(&self, timeout_us: u64) {
        self.settings.lock().data_timeout_us = if timeout_us == 0 {
            DEFAULT_DATA_TIMEOUT_US
        } else {
            timeout_us
        };
    }

    /// Set the TCP timeout for command replies (us; 0 restores the 10 s
    /// default).
    pub fn set_command_timeout_us(&self, timeout_us: u64) {
        self.settings.lock().command_timeout_us = if timeout_us == 0 {
            DEFAULT_COMMAND_TIMEOUT_US
        } else {
            timeout_us
        };
    }

    /// Set the UDP receive buffer size (bytes; 0 restores the 32 KiB
    /// default). Takes effect when the receiver is next armed.
    pub fn set_data_buffer_size(&self, bytes: usize) {
        self.settings.lock().data_buffer_size = if bytes == 0 {
            DEFAULT_DATA_BUFFER_SIZE
        } else {
            bytes
        };
    }

    // -----------------------------------------------------------------
    // measurement
    // -----------------------------------------------------------------

    /// Start measurement: instruct the controller if the command
    /// interface is up, prime the firewall and arm the UDP receiver.
    ///
    /// The priming packet is sent and the receiver is armed even when the
    /// controller refuses the tracking command; the refusal is still
    /// reported, and the controller-reported error is retained.
    pub fn start_measurement(&self) -> Result<()> {
        let command_result = if self.is_command_interface_valid() {
            match self.send_dtrack2_command("dtrack2 tracking start") {
                ResponseClass::Ok => Ok(()),
                other => Err(Error::Command(format!(
                    "tracking start refused: {:?}",
                    other
                ))),
            }
        } else {
            Ok(())
        };

        self.send_firewall_packet();

        let buf_size = self.settings.lock().data_buffer_size;
        {
            let mut guard = self.udp.lock();
            let udp = guard
                .as_mut()
                .ok_or_else(|| Error::Net("data interface closed".into()))?;
            udp.start(buf_size)?;
        }

        command_result
    }

    /// Stop measurement: disarm the UDP receiver, then instruct the
    /// controller if the command interface is up. A pending [`receive`]
    /// returns with a terminated indication.
    ///
    /// [`receive`]: DrishtiIO::receive
    pub fn stop_measurement(&self) -> Result<()> {
        if let Some(udp) = self.udp.lock().as_mut() {
            udp.terminate();
        }

        if self.is_command_interface_valid() {
            match self.send_dtrack2_command("dtrack2 tracking stop") {
                ResponseClass::Ok => {}
                other => {
                    return Err(Error::Command(format!(
                        "tracking stop refused: {:?}",
                        other
                    )))
                }
            }
        }
        Ok(())
    }

    /// Receive and process one measurement datagram. Blocks until a
    /// datagram arrives, but no longer than the data timeout. Arms the
    /// UDP receiver if necessary.
    ///
    /// On success the returned frame has also been published as the
    /// session's current frame. On failure the previous frame stays
    /// current and the last data error is set.
    pub fn receive(&self) -> Result<Arc<Frame>> {
        *self.last_data_error.lock() = ErrorKind::None;

        let result = self.receive_inner();
        if let Err(err) = &result {
            *self.last_data_error.lock() = ErrorKind::of(err);
        }
        result
    }

    fn receive_inner(&self) -> Result<Arc<Frame>> {
        let (timeout, buf_size) = {
            let settings = self.settings.lock();
            (settings.data_timeout(), settings.data_buffer_size)
        };

        // take a handle to the datagram channel, then block without any
        // lock held so stop_measurement / close stay callable
        let datagrams = {
            let mut guard = self.udp.lock();
            let udp = guard
                .as_mut()
                .ok_or_else(|| Error::Net("data interface closed".into()))?;
            if !udp.is_started() {
                udp.start(buf_size)?;
            }
            udp.datagrams()
                .ok_or_else(|| Error::Net("receiver not started".into()))?
        };

        let datagram = recv_datagram(&datagrams, timeout)?;

        let text = String::from_utf8_lossy(&datagram.payload).into_owned();
        *self.last_source.lock() = Some(datagram.source);
        *self.last_buffer.lock() = text.clone();

        self.publish(&text)
    }

    /// Process one tracking packet supplied by the caller instead of the
    /// network. Requires no connection to a controller; fails only on
    /// empty input or malformed data.
    pub fn process_packet(&self, data: &str) -> Result<Arc<Frame>> {
        *self.last_data_error.lock() = ErrorKind::None;

        let result = if data.is_empty() {
            Err(Error::Parse("empty packet".into()))
        } else {
            *self.last_buffer.lock() = data.to_string();
            self.publish(data)
        };

        if let Err(err) = &result {
            *self.last_data_error.lock() = ErrorKind::of(err);
        }
        result
    }

    fn publish(&self, text: &str) -> Result<Arc<Frame>> {
        let frame = Arc::new(parse_frame(text)?);
        *self.frame.write() = Arc::clone(&frame);
        Ok(frame)
    }

    /// The current frame: the result of the most recent successful
    /// receive or packet processing. Cheap to call; the returned pointer
    /// stays valid and unchanged however often new frames are published.
    pub fn frame(&self) -> Arc<Frame> {
        Arc::clone(&self.frame.read())
    }

    /// Raw text of the most recent measurement datagram.
    pub fn last_buffer(&self) -> String {
        self.last_buffer.lock().clone()
    }

    // -----------------------------------------------------------------
    // error channels
    // -----------------------------------------------------------------

    /// Most recent error of the data channel (receive / packet
    /// processing).
    pub fn last_data_error(&self) -> ErrorKind {
        *self.last_data_error.lock()
    }

    /// Most recent error of the command channel.
    pub fn last_server_error(&self) -> ErrorKind {
        *self.last_server_error.lock()
    }

    /// Most recent controller-reported command error as `(code,
    /// description)`, `(0, "")` if the last command was accepted.
    pub fn last_dtrack_error(&self) -> (i32, String) {
        self.last_dtrack_error.lock().clone()
    }

    // -----------------------------------------------------------------
    // commands
    // -----------------------------------------------------------------

    /// Send one `dtrack2` command and classify the reply. The command is
    /// NUL-terminated on the wire; commands over the protocol's length
    /// bound are refused without touching the socket.
    ///
    /// `dtrack2 err` replies additionally set the controller-reported
    /// error retrievable with [`last_dtrack_error`].
    ///
    /// [`last_dtrack_error`]: DrishtiIO::last_dtrack_error
    pub fn send_dtrack2_command(&self, command: &str) -> ResponseClass {
        *self.last_server_error.lock() = ErrorKind::None;
        *self.last_dtrack_error.lock() = (0, String::new());

        let timeout = self.settings.lock().command_timeout();

        let mut guard = self.tcp.lock();
        let Some(tcp) = guard.as_mut() else {
            *self.last_server_error.lock() = ErrorKind::Net;
            return ResponseClass::Transport;
        };

        let class = tcp.exchange(command, timeout);
        match &class {
            ResponseClass::Ok | ResponseClass::Payload(_) => {}
            ResponseClass::DtrackErr { code, message } => {
                *self.last_dtrack_error.lock() = (*code, message.clone());
            }
            ResponseClass::Timeout => *self.last_server_error.lock() = ErrorKind::Timeout,
            ResponseClass::Malformed => {
                *self.last_server_error.lock() = ErrorKind::Parse;
                *self.last_dtrack_error.lock() = (-1100, "reply parser error".into());
            }
            ResponseClass::Transport | ResponseClass::TooLong => {
                *self.last_server_error.lock() = ErrorKind::Net;
            }
        }
        class
    }

    /// Get a controller parameter. `None` on any failure; the last server
    /// error or controller-reported error tells why.
    pub fn get_param(&self, category: &str, name: &str) -> Option<String> {
        self.get_param_joined(&format!("{} {}", category, name))
    }

    /// Get a controller parameter from a joined "category name" string.
    pub fn get_param_joined(&self, parameter: &str) -> Option<String> {
        let class = self.send_dtrack2_command(&format!("dtrack2 get {}", parameter));
        let ResponseClass::Payload(body) = class else {
            return None;
        };

        let Some(echo) = body.strip_prefix("dtrack2 set ") else {
            *self.last_server_error.lock() = ErrorKind::Parse;
            return None;
        };

        match match_parameter_echo(echo, parameter) {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                *self.last_server_error.lock() = ErrorKind::Parse;
                None
            }
        }
    }

    /// Set a controller parameter.
    pub fn set_param(&self, category: &str, name: &str, value: &str) -> Result<()> {
        self.set_param_joined(&format!("{} {} {}", category, name, value))
    }

    /// Set a controller parameter from a joined "category name value"
    /// string.
    pub fn set_param_joined(&self, parameter: &str) -> Result<()> {
        match self.send_dtrack2_command(&format!("dtrack2 set {}", parameter)) {
            ResponseClass::Ok => Ok(()),
            ResponseClass::DtrackErr { code, message } => Err(Error::Command(format!(
                "controller refused parameter ({}): {}",
                code, message
            ))),
            other => Err(Error::Command(format!("set failed: {:?}", other))),
        }
    }

    /// Retrieve one event message from the controller, if one is pending.
    /// The message is also retained as [`last_message`].
    ///
    /// [`last_message`]: DrishtiIO::last_message
    pub fn get_message(&self) -> Option<EventMessage> {
        let class = self.send_dtrack2_command("dtrack2 getmsg");
        let ResponseClass::Payload(body) = class else {
            return None;
        };

        let message = EventMessage::parse(&body)?;
        *self.last_message.lock() = message.clone();
        Some(message)
    }

    /// The most recent event message retrieved with [`get_message`].
    ///
    /// [`get_message`]: DrishtiIO::get_message
    pub fn last_message(&self) -> EventMessage {
        self.last_message.lock().clone()
    }

    // -----------------------------------------------------------------
    // stateful firewall
    // -----------------------------------------------------------------

    /// Enable inbound UDP through a stateful firewall, for listening
    /// modes (communicating mode primes automatically). Uses the
    /// controller's default sender port.
    pub fn enable_stateful_firewall_connection(&self, sender_host: &str) -> Result<()> {
        self.enable_stateful_firewall_connection_to(sender_host, PORT_UDP_SENDER)
    }

    /// Like [`enable_stateful_firewall_connection`] with an explicit
    /// sender port.
    ///
    /// [`enable_stateful_firewall_connection`]: DrishtiIO::enable_stateful_firewall_connection
    pub fn enable_stateful_firewall_connection_to(
        &self,
        sender_host: &str,
        sender_port: u16,
    ) -> Result<()> {
        let ip = resolve_host(sender_host)?;
        *self.udp_sender.lock() = Some(SocketAddr::new(ip, sender_port));

        if !self.send_firewall_packet() {
            return Err(Error::Net("priming packet not sent".into()));
        }
        Ok(())
    }

    /// Send the priming packet from the local data port to the
    /// controller's sender port. The firewall then treats inbound
    /// measurement datagrams as replies.
    fn send_firewall_packet(&self) -> bool {
        let Some(target) = *self.udp_sender.lock() else {
            return false;
        };
        let guard = self.udp.lock();
        let Some(udp) = guard.as_ref() else {
            return false;
        };
        match udp.send_to(target, FIREWALL_TOKEN) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("firewall priming packet to {} failed: {}", target, e);
                false
            }
        }
    }

    // -----------------------------------------------------------------
    // feedback
    // -----------------------------------------------------------------

    /// Tactile feedback on one finger. Strength must lie in [0.0, 1.0];
    /// out-of-range values are refused without network I/O.
    pub fn tactile_finger(&self, hand_id: u32, finger_id: u32, strength: f64) -> Result<()> {
        let wire = feedback::tactile_finger(hand_id, finger_id, strength)?;
        self.send_feedback(&wire)
    }

    /// Tactile feedback on all fingers of one hand, one strength per
    /// finger.
    pub fn tactile_hand(&self, hand_id: u32, strengths: &[f64]) -> Result<()> {
        let wire = feedback::tactile_hand(hand_id, strengths)?;
        self.send_feedback(&wire)
    }

    /// Turn tactile feedback off on all fingers of one hand.
    pub fn tactile_hand_off(&self, hand_id: u32, num_fingers: usize) -> Result<()> {
        let wire = feedback::tactile_hand_off(hand_id, num_fingers)?;
        self.send_feedback(&wire)
    }

    /// Start a beep on a Flystick.
    pub fn flystick_beep(&self, flystick_id: u32, duration_ms: f64, frequency_hz: f64) -> Result<()> {
        self.send_feedback(&feedback::flystick_beep(flystick_id, duration_ms, frequency_hz))
    }

    /// Start a vibration pattern on a Flystick.
    pub fn flystick_vibration(&self, flystick_id: u32, vibration_pattern: u32) -> Result<()> {
        self.send_feedback(&feedback::flystick_vibration(flystick_id, vibration_pattern))
    }

    /// Fire-and-forget send to the controller's feedback port. Falls back
    /// to the source of the latest measurement datagram when the
    /// controller address is unknown.
    fn send_feedback(&self, wire: &[u8]) -> Result<()> {
        let ip = match self.controller_ip {
            Some(ip) => ip,
            None => self
                .last_source
                .lock()
                .as_ref()
                .map(|addr| addr.ip())
                .ok_or_else(|| Error::Net("no feedback target known yet".into()))?,
        };

        let guard = self.udp.lock();
        let udp = guard
            .as_ref()
            .ok_or_else(|| Error::Net("data interface closed".into()))?;
        udp.send_to(SocketAddr::new(ip, PORT_FEEDBACK), wire)
    }

    // -----------------------------------------------------------------
    // shutdown
    // -----------------------------------------------------------------

    /// Close both sockets. Idempotent; a second call is a no-op, and a
    /// concurrent pending [`receive`] returns with a terminated
    /// indication.
    ///
    /// [`receive`]: DrishtiIO::receive
    pub fn close(&self) {
        if let Some(mut udp) = self.udp.lock().take() {
            udp.terminate();
        }
        *self.tcp.lock() = None;
    }
}

impl Drop for DrishtiIO {
    fn drop(&mut self) {
        self.close();
    }
}

fn resolve_host(host: &str) -> Result<IpAddr> {
    // port irrelevant, ToSocketAddrs needs one
    let mut addrs = (host, 0u16)
        .to_socket_addrs()
        .map_err(|e| Error::Connection(format!("can't resolve {:?}: {}", host, e)))?;
    addrs
        .next()
        .map(|a| a.ip())
        .ok_or_else(|| Error::Connection(format!("no address for {:?}", host)))
}
