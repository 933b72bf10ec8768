//! Universal demo: receive and print everything the controller sends
//!
//! Usage: `universal [<server host/ip>:]<data port>[:fw]`

use drishti_io::{DrishtiIO, ErrorKind, Frame};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> drishti_io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Some(connection) = env::args().nth(1) else {
        eprintln!("Usage: universal [<server host/ip>:]<data port>[:fw]");
        std::process::exit(2);
    };

    let dt = DrishtiIO::new(&connection)?;

    if !dt.is_valid() {
        if !dt.is_command_interface_valid() {
            eprintln!("cannot connect to controller");
        } else {
            // maybe the DTrack front-end is still connected to the controller
            eprintln!("full access to controller required");
        }
        std::process::exit(1);
    }

    println!(
        "connected to '{}', listening at local data port {}",
        connection,
        dt.data_port()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::Relaxed))
        .map_err(|e| drishti_io::Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    dt.start_measurement()?;

    let mut count = 0u32;
    while running.load(Ordering::Relaxed) && count < 1000 {
        count += 1;
        match dt.receive() {
            Ok(frame) => output(&frame),
            Err(e) => {
                eprintln!("no frame: {} (last data error {:?})", e, dt.last_data_error());
                messages_to_console(&dt);
            }
        }

        if count % 100 == 0 {
            messages_to_console(&dt);
        }
    }

    dt.stop_measurement()?;
    messages_to_console(&dt);
    dt.close();
    Ok(())
}

fn output(frame: &Frame) {
    println!(
        "\nframe {} ts {:?} lat {:?}",
        frame.frame_counter, frame.timestamp, frame.latency_us
    );
    println!(
        "      nbod {} nfly {} nmea {} nmearef {} nhand {} nmar {} nhuman {} ninertial {} status {}",
        frame.num_bodies(),
        frame.num_flysticks(),
        frame.num_tools(),
        frame.num_references(),
        frame.num_hands(),
        frame.num_markers(),
        frame.num_humans(),
        frame.num_inertial_bodies(),
        if frame.status.is_some() { "yes" } else { "no" }
    );

    for body in &frame.bodies {
        if !body.is_tracked() {
            println!("bod {} not tracked", body.id);
        } else {
            println!(
                "bod {} qu {:.3} loc {:.3} {:.3} {:.3}",
                body.id, body.quality, body.loc[0], body.loc[1], body.loc[2]
            );
        }
    }

    for fly in &frame.flysticks {
        let buttons: String = fly.buttons.iter().map(|&b| if b { '1' } else { '0' }).collect();
        println!(
            "fly {} qu {:.3} bt {} joy {:?}",
            fly.id, fly.quality, buttons, fly.joysticks
        );
    }

    for tool in &frame.tools {
        println!(
            "mea {} qu {:.3} radius {:?} loc {:.3} {:.3} {:.3}",
            tool.id, tool.quality, tool.tip_radius, tool.loc[0], tool.loc[1], tool.loc[2]
        );
    }

    for hand in &frame.hands {
        println!(
            "hand {} qu {:.3} {:?} nfinger {}",
            hand.id,
            hand.quality,
            hand.handedness,
            hand.num_fingers()
        );
    }

    for marker in &frame.markers {
        println!(
            "mar {} qu {:.3} loc {:.3} {:.3} {:.3}",
            marker.id, marker.quality, marker.loc[0], marker.loc[1], marker.loc[2]
        );
    }

    for human in &frame.humans {
        println!("human {} njoint {}", human.id, human.num_joints());
    }

    for body in &frame.inertial_bodies {
        println!(
            "inertial {} state {:?} error {:.3} loc {:.3} {:.3} {:.3}",
            body.id, body.state, body.error, body.loc[0], body.loc[1], body.loc[2]
        );
    }

    if let Some(status) = &frame.status {
        println!(
            "status: {} cameras, {} bodies, {} markers",
            status.num_cameras, status.num_tracked_bodies, status.num_tracked_markers
        );
        for cam in &status.cameras {
            println!(
                "   cam {} refl {} used {} maxint {}",
                cam.id, cam.num_reflections, cam.num_reflections_used, cam.max_intensity
            );
        }
    }
}

/// Drain pending controller event messages to the console.
fn messages_to_console(dt: &DrishtiIO) {
    if !dt.is_command_interface_valid() {
        return;
    }
    while let Some(msg) = dt.get_message() {
        println!(
            "controller message: '{}' '{}' frame {} id 0x{:x} '{}'",
            msg.origin, msg.status, msg.frame_nr, msg.error_id, msg.message
        );
    }
    if dt.last_server_error() != ErrorKind::None {
        eprintln!("command channel error: {:?}", dt.last_server_error());
    }
}
