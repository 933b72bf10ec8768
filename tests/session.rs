//! Session-layer integration tests over loopback sockets

use drishti_io::{DrishtiIO, ErrorKind};
use std::io::{Read, Write};
use std::net::{TcpListener, UdpSocket};
use std::time::Duration;

#[test]
fn test_receives_and_parses_measurement_datagram() {
    let dt = DrishtiIO::listen(0).unwrap();
    dt.start_measurement().unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let buf = "fr 42\nts 12.345678\n6d 1 [0 0.950][100.0 200.0 -50.5][1 0 0 0 1 0 0 0 1]\n";
    sender
        .send_to(buf.as_bytes(), ("127.0.0.1", dt.data_port()))
        .unwrap();

    let frame = dt.receive().unwrap();
    assert_eq!(frame.frame_counter, 42);
    assert_eq!(frame.timestamp, Some(12.345678));
    assert_eq!(frame.num_bodies(), 1);
    assert_eq!(frame.body(0).unwrap().loc, [100.0, 200.0, -50.5]);
    assert_eq!(dt.last_data_error(), ErrorKind::None);
    assert_eq!(dt.last_buffer(), buf);
}

#[test]
fn test_timeout_leaves_previous_frame_untouched() {
    let dt = DrishtiIO::listen(0).unwrap();
    dt.start_measurement().unwrap();
    dt.set_data_timeout_us(50_000);

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    sender
        .send_to(b"fr 7\n", ("127.0.0.1", dt.data_port()))
        .unwrap();
    dt.receive().unwrap();
    assert_eq!(dt.frame().frame_counter, 7);

    // nothing arrives now
    assert!(dt.receive().is_err());
    assert_eq!(dt.last_data_error(), ErrorKind::Timeout);
    assert_eq!(dt.frame().frame_counter, 7);
}

#[test]
fn test_malformed_datagram_keeps_previous_frame() {
    let dt = DrishtiIO::listen(0).unwrap();
    dt.start_measurement().unwrap();
    dt.set_data_timeout_us(500_000);

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let target = ("127.0.0.1", dt.data_port());
    sender.send_to(b"fr 7\n", target).unwrap();
    dt.receive().unwrap();

    sender
        .send_to(b"6d 2 [0 1.0][0 0 0][1 0 0 0 1 0 0 0 1]\n", target)
        .unwrap();
    assert!(dt.receive().is_err());
    assert_eq!(dt.last_data_error(), ErrorKind::Parse);
    assert_eq!(dt.frame().frame_counter, 7);

    // the session keeps working afterwards
    sender.send_to(b"fr 8\n", target).unwrap();
    assert_eq!(dt.receive().unwrap().frame_counter, 8);
}

#[test]
fn test_firewall_priming_packet_originates_from_data_port() {
    let controller = UdpSocket::bind("127.0.0.1:0").unwrap();
    controller
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let sender_port = controller.local_addr().unwrap().port();

    let dt = DrishtiIO::listen(0).unwrap();
    dt.enable_stateful_firewall_connection_to("127.0.0.1", sender_port)
        .unwrap();

    let mut buf = [0u8; 64];
    let (len, source) = controller.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], &b"fw4dtsdkj"[..]);
    assert_eq!(source.port(), dt.data_port());
}

#[test]
fn test_feedback_goes_to_source_of_last_datagram() {
    // the feedback port is fixed by the controller; skip when occupied
    let Ok(feedback) = UdpSocket::bind(("127.0.0.1", 50110)) else {
        eprintln!("feedback port busy, skipping");
        return;
    };
    feedback
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let dt = DrishtiIO::listen(0).unwrap();
    dt.start_measurement().unwrap();

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    sender
        .send_to(b"fr 1\n", ("127.0.0.1", dt.data_port()))
        .unwrap();
    dt.receive().unwrap();

    dt.flystick_beep(1, 500.0, 2000.0).unwrap();

    let mut buf = [0u8; 128];
    let (len, _) = feedback.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], &b"ffb 1 [1 500 2000 0 0][]\0"[..]);
}

#[test]
fn test_stop_measurement_unblocks_pending_receive() {
    let dt = std::sync::Arc::new(DrishtiIO::listen(0).unwrap());
    dt.start_measurement().unwrap();
    dt.set_data_timeout_us(5_000_000);

    let receiver = std::sync::Arc::clone(&dt);
    let pending = std::thread::spawn(move || receiver.receive());

    std::thread::sleep(Duration::from_millis(100));
    dt.stop_measurement().unwrap();

    // the blocked receive returns well before the 5 s timeout
    let result = pending.join().unwrap();
    assert!(result.is_err());
}

#[test]
fn test_close_is_idempotent_with_pending_receive() {
    let dt = std::sync::Arc::new(DrishtiIO::listen(0).unwrap());
    dt.start_measurement().unwrap();
    dt.set_data_timeout_us(5_000_000);

    let receiver = std::sync::Arc::clone(&dt);
    let pending = std::thread::spawn(move || receiver.receive());

    std::thread::sleep(Duration::from_millis(100));
    dt.close();
    dt.close();

    assert!(pending.join().unwrap().is_err());
    assert!(!dt.is_data_interface_valid());
}

/// Minimal controller command endpoint: replies to the handful of
/// `dtrack2` commands the tests exercise. The first `tracking start` is
/// refused, any later one is accepted.
fn spawn_command_endpoint(listener: TcpListener) {
    std::thread::spawn(move || {
        let (mut peer, _) = listener.accept().unwrap();
        let mut pending = Vec::new();
        let mut buf = [0u8; 512];
        let mut tracking_starts = 0u32;
        loop {
            let n = match peer.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            pending.extend_from_slice(&buf[..n]);

            while let Some(end) = pending.iter().position(|&b| b == 0) {
                let command = String::from_utf8_lossy(&pending[..end]).into_owned();
                pending.drain(..=end);

                let reply: &[u8] = match command.as_str() {
                    "dtrack2 get system access" => b"dtrack2 set system access full\0",
                    "dtrack2 tracking start" => {
                        tracking_starts += 1;
                        if tracking_starts == 1 {
                            b"dtrack2 err 5 \"tracking already running\"\0"
                        } else {
                            b"dtrack2 ok\0"
                        }
                    }
                    "dtrack2 tracking stop" => b"dtrack2 ok\0",
                    "dtrack2 getmsg" => b"dtrack2 msg cam ok 17 0x000000a3 \"lens dirty\"\0",
                    "dtrack2 set system latency low" => b"dtrack2 ok\0",
                    _ => b"dtrack2 err 2 \"unknown command\"\0",
                };
                if peer.write_all(reply).is_err() {
                    return;
                }
            }
        }
    });
}

#[test]
fn test_command_session_against_mock_controller() {
    // the command port is fixed by the controller; skip when occupied
    let Ok(listener) = TcpListener::bind(("127.0.0.1", 50105)) else {
        eprintln!("command port busy, skipping");
        return;
    };
    spawn_command_endpoint(listener);

    // capture firewall priming packets on the controller's sender port;
    // skip those assertions when the fixed port is occupied
    let primed = UdpSocket::bind(("127.0.0.1", 50107)).ok();
    if let Some(socket) = &primed {
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
    }

    let dt = DrishtiIO::new("127.0.0.1:0").unwrap();
    assert!(dt.is_command_interface_valid());

    // communicating mode primes the firewall already at construction
    if let Some(socket) = &primed {
        let mut buf = [0u8; 64];
        socket.recv_from(&mut buf).unwrap();
    }

    // full access probe echoes the request before the value
    assert!(dt.is_command_interface_full_access());
    assert!(dt.is_valid());

    // the first tracking start is refused by the mock; the refusal is
    // reported, but the priming packet still goes out and the receiver
    // still arms
    assert!(dt.start_measurement().is_err());
    let (code, description) = dt.last_dtrack_error();
    assert_eq!(code, 5);
    assert_eq!(description, "tracking already running");

    if let Some(socket) = &primed {
        let mut buf = [0u8; 64];
        let (len, source) = socket.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], &b"fw4dtsdkj"[..]);
        assert_eq!(source.port(), dt.data_port());
    }

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    sender
        .send_to(b"fr 5\n", ("127.0.0.1", dt.data_port()))
        .unwrap();
    assert_eq!(dt.receive().unwrap().frame_counter, 5);

    // the second start succeeds, then the rest of the lifecycle
    dt.start_measurement().unwrap();
    dt.stop_measurement().unwrap();

    // parameter set round-trip
    dt.set_param("system", "latency", "low").unwrap();

    // controller-reported errors are retained
    assert!(dt.set_param_joined("bogus param x").is_err());
    let (code, description) = dt.last_dtrack_error();
    assert_eq!(code, 2);
    assert_eq!(description, "unknown command");

    // event message retrieval
    let msg = dt.get_message().unwrap();
    assert_eq!(msg.origin, "cam");
    assert_eq!(msg.status, "ok");
    assert_eq!(msg.frame_nr, 17);
    assert_eq!(msg.error_id, 0xa3);
    assert_eq!(msg.message, "lens dirty");
    assert_eq!(dt.last_message(), msg);

    dt.close();
}
