//! DTrack2/DTRACK3 command protocol: well-known constants, response
//! classification, parameter-echo matching and event messages

pub mod matcher;
pub mod message;
pub mod response;

pub use matcher::match_parameter_echo;
pub use message::EventMessage;
pub use response::ResponseClass;

/// Controller port (TCP) for `dtrack2` commands
pub const PORT_COMMAND: u16 = 50105;

/// Controller port (UDP) from which tracking data is sent; target of the
/// stateful-firewall priming packet
pub const PORT_UDP_SENDER: u16 = 50107;

/// Controller port (UDP) for feedback commands
pub const PORT_FEEDBACK: u16 = 50110;

/// Maximum length of one `dtrack2` command or reply (bytes)
pub const MAX_COMMAND_LEN: usize = 200;

/// Payload of the stateful-firewall priming packet. The content is
/// irrelevant to the controller; the packet exists to create conntrack
/// state so inbound measurement datagrams pass as replies.
pub const FIREWALL_TOKEN: &[u8] = b"fw4dtsdkj";
