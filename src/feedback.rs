//! Feedback datagram formatting
//!
//! Tactile FINGERTRACKING and Flystick actuation commands are single ASCII
//! datagrams, NUL-terminated, fire-and-forget. The builders here only
//! format bytes; the session facade resolves the destination and sends.
//! Strengths outside [0.0, 1.0] are refused before any datagram exists, so
//! an out-of-range request never reaches the network.

use crate::error::{Error, Result};

/// Tactile feedback on one finger of one hand.
///
/// `tfb 1 [<hand> <finger> 1.0 <strength>]`
pub fn tactile_finger(hand_id: u32, finger_id: u32, strength: f64) -> Result<Vec<u8>> {
    check_strength(strength)?;

    let mut out = format!("tfb 1 [{} {} 1.0 {:?}]", hand_id, finger_id, strength).into_bytes();
    out.push(0);
    Ok(out)
}

/// Tactile feedback on all fingers of one hand, one strength per finger.
///
/// `tfb <N> [<hand> 0 1.0 <s0>][<hand> 1 1.0 <s1>]...`
pub fn tactile_hand(hand_id: u32, strengths: &[f64]) -> Result<Vec<u8>> {
    for &strength in strengths {
        check_strength(strength)?;
    }

    let mut out = format!("tfb {} ", strengths.len());
    for (finger, &strength) in strengths.iter().enumerate() {
        out.push_str(&format!("[{} {} 1.0 {:?}]", hand_id, finger, strength));
    }
    let mut out = out.into_bytes();
    out.push(0);
    Ok(out)
}

/// Turn tactile feedback off on all fingers of one hand.
pub fn tactile_hand_off(hand_id: u32, num_fingers: usize) -> Result<Vec<u8>> {
    tactile_hand(hand_id, &vec![0.0; num_fingers])
}

/// Start a beep on one Flystick. Duration and frequency are truncated to
/// whole milliseconds / Hertz on the wire.
///
/// `ffb 1 [<id> <durationMs> <frequencyHz> 0 0][]`
pub fn flystick_beep(flystick_id: u32, duration_ms: f64, frequency_hz: f64) -> Vec<u8> {
    let mut out = format!(
        "ffb 1 [{} {} {} 0 0][]",
        flystick_id, duration_ms as i32, frequency_hz as i32
    )
    .into_bytes();
    out.push(0);
    out
}

/// Start a vibration pattern on one Flystick.
///
/// `ffb 1 [<id> 0 0 <pattern> 0][]`
pub fn flystick_vibration(flystick_id: u32, vibration_pattern: u32) -> Vec<u8> {
    let mut out = format!("ffb 1 [{} 0 0 {} 0][]", flystick_id, vibration_pattern).into_bytes();
    out.push(0);
    out
}

fn check_strength(strength: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&strength) {
        log::error!("tactile strength {} not in range (0.0 - 1.0)", strength);
        return Err(Error::Command(format!(
            "tactile strength {} not in range (0.0 - 1.0)",
            strength
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tactile_finger_wire_format() {
        let wire = tactile_finger(0, 2, 0.5).unwrap();
        assert_eq!(wire, b"tfb 1 [0 2 1.0 0.5]\0");
    }

    #[test]
    fn test_tactile_finger_range() {
        assert!(tactile_finger(0, 0, 0.0).is_ok());
        assert!(tactile_finger(0, 0, 1.0).is_ok());
        assert!(tactile_finger(0, 0, 1.0000001).is_err());
        assert!(tactile_finger(0, 0, -0.1).is_err());
    }

    #[test]
    fn test_tactile_hand_wire_format() {
        let wire = tactile_hand(1, &[0.25, 1.0]).unwrap();
        assert_eq!(wire, b"tfb 2 [1 0 1.0 0.25][1 1 1.0 1.0]\0");
    }

    #[test]
    fn test_tactile_hand_rejects_one_bad_strength() {
        assert!(tactile_hand(0, &[0.5, 1.5, 0.5]).is_err());
    }

    #[test]
    fn test_hand_off_equals_all_zero_hand() {
        assert_eq!(
            tactile_hand(3, &[0.0, 0.0, 0.0]).unwrap(),
            tactile_hand_off(3, 3).unwrap()
        );
    }

    #[test]
    fn test_flystick_beep_wire_format() {
        assert_eq!(flystick_beep(1, 500.0, 2000.0), b"ffb 1 [1 500 2000 0 0][]\0");
        // fractional values are truncated
        assert_eq!(flystick_beep(0, 99.9, 440.7), b"ffb 1 [0 99 440 0 0][]\0");
    }

    #[test]
    fn test_flystick_vibration_wire_format() {
        assert_eq!(flystick_vibration(2, 3), b"ffb 1 [2 0 0 3 0][]\0");
    }
}
