//! Network transports: UDP measurement receiver, TCP command stream

mod tcp;
mod udp;

pub use tcp::CommandStream;
pub use udp::{recv_datagram, Datagram, UdpReceiver};
