//! Flystick feedback demo: control a Flystick's actuator with the
//! Flystick itself
//!
//! Upper buttons start a vibration pattern, pressing the joystick starts a
//! beep with duration and frequency taken from the joystick position, and
//! the trigger button stops the program.
//!
//! Usage: `flystick_feedback [<server host/ip>:]<data port>`

use drishti_io::{DrishtiIO, Flystick};
use std::env;

/// Button layout of a Flystick2+: trigger, four upper buttons, joystick
const TRIGGER: usize = 0;
const UPPER_BUTTONS: std::ops::Range<usize> = 1..5;
const JOYSTICK_BUTTON: usize = 5;

fn main() -> drishti_io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Some(connection) = env::args().nth(1) else {
        eprintln!("Usage: flystick_feedback [<server host/ip>:]<data port>");
        std::process::exit(2);
    };

    let dt = DrishtiIO::new(&connection)?;

    if dt.is_command_interface_valid() && !dt.is_command_interface_full_access() {
        // maybe the DTrack front-end is still connected to the controller
        eprintln!("full access to controller required");
        std::process::exit(1);
    }

    println!(
        "connected to '{}', listening at local data port {}",
        connection,
        dt.data_port()
    );

    dt.start_measurement()?;

    let mut sent_feedback = false;
    'measure: loop {
        let frame = match dt.receive() {
            Ok(frame) => frame,
            Err(e) => {
                eprintln!("no frame: {}", e);
                continue;
            }
        };

        for fly in &frame.flysticks {
            // demo needs at least 8 buttons and 2 joystick values (Flystick2+)
            if fly.buttons.len() < 8 || fly.joysticks.len() < 2 {
                continue;
            }

            if fly.button(TRIGGER) {
                break 'measure;
            }

            if let Some(feedback) = wanted_feedback(fly) {
                if !sent_feedback {
                    match feedback {
                        Feedback::Vibration(pattern) => dt.flystick_vibration(fly.id, pattern)?,
                        Feedback::Beep { duration_ms, frequency_hz } => {
                            dt.flystick_beep(fly.id, duration_ms, frequency_hz)?
                        }
                    }
                    sent_feedback = true;
                }
            } else {
                sent_feedback = false;
            }
        }
    }

    dt.stop_measurement()?;
    dt.close();
    Ok(())
}

enum Feedback {
    Vibration(u32),
    Beep { duration_ms: f64, frequency_hz: f64 },
}

fn wanted_feedback(fly: &Flystick) -> Option<Feedback> {
    for button in UPPER_BUTTONS {
        if fly.button(button) {
            return Some(Feedback::Vibration(button as u32));
        }
    }

    if fly.button(JOYSTICK_BUTTON) {
        // joystick x picks the frequency, y the duration
        let frequency_hz = 2000.0 + 2000.0 * fly.joystick(0);
        let duration_ms = 500.0 + 400.0 * fly.joystick(1);
        return Some(Feedback::Beep {
            duration_ms,
            frequency_hz,
        });
    }
    None
}
