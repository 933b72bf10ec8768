//! Tactile Flystick demo: drive a tactile FINGERTRACKING device with a
//! Flystick
//!
//! Upper buttons set feedback on one finger with fixed strength, the
//! joystick sets variable strength on two fingers, and the trigger button
//! stops the program.
//!
//! Usage: `tactile_flystick [<server host/ip>:]<data port> <Flystick id> <hand id>`

use drishti_io::DrishtiIO;
use std::env;
use std::time::{Duration, Instant};

const NUM_FINGERS: usize = 3;

/// Tactile commands are repeated while unchanged so the device keeps
/// actuating.
const REPEAT_PERIOD: Duration = Duration::from_millis(1000);

fn main() -> drishti_io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let (connection, flystick_id, hand_id) = match args.as_slice() {
        [_, conn, fly, hand] => match (fly.parse::<usize>(), hand.parse::<usize>()) {
            (Ok(fly), Ok(hand)) => (conn.clone(), fly, hand),
            _ => usage(),
        },
        _ => usage(),
    };

    let dt = DrishtiIO::new(&connection)?;

    if dt.is_command_interface_valid() && !dt.is_command_interface_full_access() {
        eprintln!("full access to controller required");
        std::process::exit(1);
    }

    println!(
        "connected to '{}', listening at local data port {}",
        connection,
        dt.data_port()
    );

    dt.start_measurement()?;

    let mut strengths = [0.0f64; NUM_FINGERS];
    let mut last_sent = Instant::now();

    loop {
        let frame = match dt.receive() {
            Ok(frame) => frame,
            Err(e) => {
                eprintln!("no frame: {}", e);
                continue;
            }
        };

        let Some(fly) = frame.flystick(flystick_id) else {
            eprintln!("Flystick id {} doesn't exist", flystick_id);
            break;
        };
        if frame.hand(hand_id).is_none() {
            eprintln!("hand id {} doesn't exist", hand_id);
            break;
        }

        if fly.button(0) {
            break; // trigger stops the program
        }

        let wanted = wanted_strengths(fly.buttons.as_slice(), fly.joysticks.as_slice());
        if wanted != strengths || last_sent.elapsed() >= REPEAT_PERIOD {
            dt.tactile_hand(hand_id as u32, &wanted)?;
            strengths = wanted;
            last_sent = Instant::now();
        }
    }

    dt.tactile_hand_off(hand_id as u32, NUM_FINGERS)?;

    dt.stop_measurement()?;
    dt.close();
    Ok(())
}

fn usage() -> ! {
    eprintln!("Usage: tactile_flystick [<server host/ip>:]<data port> <Flystick id> <hand id>");
    std::process::exit(2);
}

/// Upper buttons 1..3 request full strength on one finger; the joystick
/// x axis blends strength between thumb and middle finger.
fn wanted_strengths(buttons: &[bool], joysticks: &[f64]) -> [f64; NUM_FINGERS] {
    let mut strengths = [0.0; NUM_FINGERS];

    for finger in 0..NUM_FINGERS {
        if buttons.get(finger + 1).copied().unwrap_or(false) {
            strengths[finger] = 1.0;
        }
    }

    if let Some(&x) = joysticks.first() {
        if x > 0.0 {
            strengths[0] = x;
        } else if x < 0.0 {
            strengths[2] = -x;
        }
    }
    strengths
}
