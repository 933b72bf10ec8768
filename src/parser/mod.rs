//! Measurement-frame parser
//!
//! Converts one ASCII measurement datagram into a [`Frame`]. The datagram
//! is a sequence of tagged records (`fr`, `ts`, `6d`, `6df2`, `gl`, ...);
//! each known tag has its own parser below, dispatched from
//! [`parse_frame`]. Unknown tags are skipped so that datagrams from newer
//! controllers never fail the frame.
//!
//! # Failure Model
//!
//! A record whose declared count disagrees with its bracket structure, a
//! non-numeric required field, or a truncated group fails the whole frame;
//! the caller keeps its previous frame in that case. Malformed `ts`,
//! `ts2`, `lat` and `status` records degrade to "not transmitted" instead
//! of failing the frame.

pub(crate) mod scanner;

use crate::error::{Error, Result};
use crate::types::{
    Body, CameraStatus, Finger, Flystick, Frame, Hand, Handedness, HumanModel, InertialBody,
    Joint, Marker, MeasurementTool, MessageCounters, Rotation, SystemStatus, TimestampExt,
    TrackingState,
};
use scanner::{Group, GroupCursor, Record};

/// Tags whose malformed payload drops the record, not the frame
const TOLERANT_TAGS: [&str; 4] = ["ts", "ts2", "lat", "status"];

/// Parse one measurement datagram into a fresh frame.
///
/// The parser is pure: identical input yields identical output.
pub fn parse_frame(buf: &str) -> Result<Frame> {
    let mut frame = Frame::default();

    for line in buf.lines() {
        let mut rest = line.trim();
        while !rest.is_empty() {
            let tag = match scanner::peek_tag(rest) {
                Some(tag) => tag,
                None => {
                    return Err(Error::Parse(format!(
                        "expected record tag, found {:?}",
                        rest.chars().next().unwrap_or(' ')
                    )))
                }
            };

            let scanned = scanner::scan_record(rest);
            let (record, tail) = match scanned {
                Ok(ok) => ok,
                Err(err) if TOLERANT_TAGS.contains(&tag) => {
                    // e.g. a truncated status record at the end of the
                    // datagram; drop the rest of the line, keep the frame
                    log::debug!("dropping malformed {:?} record: {}", tag, err);
                    break;
                }
                Err(err) => return Err(err),
            };
            rest = tail.trim_start();

            if let Err(err) = dispatch_record(&record, &mut frame) {
                if TOLERANT_TAGS.contains(&record.tag) {
                    log::debug!("dropping malformed {:?} record: {}", record.tag, err);
                    continue;
                }
                return Err(err);
            }
        }
    }

    Ok(frame)
}

fn dispatch_record(record: &Record<'_>, frame: &mut Frame) -> Result<()> {
    match record.tag {
        "fr" => frame.frame_counter = record.head_uint(0)?,
        "ts" => frame.timestamp = Some(record.head_double(0)?),
        "ts2" => {
            frame.timestamp_ext = Some(TimestampExt {
                sec: record.head_u64(0)?,
                usec: record.head_uint(1)?,
            })
        }
        "lat" => frame.latency_us = Some(record.head_uint(0)?),
        "6d" => frame.bodies = parse_bodies(record)?,
        "6dmtr" => frame.references = parse_bodies(record)?,
        "6df2" => frame.flysticks = parse_flysticks(record, true)?,
        "6df" => frame.flysticks = parse_flysticks(record, false)?,
        "6dmt" => frame.tools = parse_tools(record, ToolVariant::Plain)?,
        "6dmt2" => frame.tools = parse_tools(record, ToolVariant::Buttons)?,
        "6dmt3" => frame.tools = parse_tools(record, ToolVariant::ButtonsRadius)?,
        "gl" => frame.hands = parse_hands(record)?,
        "3d" => frame.markers = parse_markers(record)?,
        "human" => frame.humans = parse_humans(record)?,
        "6di" => frame.inertial_bodies = parse_inertial(record)?,
        "status" => frame.status = Some(parse_status(record)?),
        other => log::debug!("skipping unknown record {:?}", other),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// shared group shapes
// ---------------------------------------------------------------------------

fn location(group: &Group<'_>) -> Result<[f64; 3]> {
    group.expect_len(3, "location")?;
    Ok([group.double(0)?, group.double(1)?, group.double(2)?])
}

fn rotation(group: &Group<'_>) -> Result<Rotation> {
    group.expect_len(9, "rotation")?;
    let mut m = [0.0; 9];
    for (i, slot) in m.iter_mut().enumerate() {
        *slot = group.double(i)?;
    }
    Ok(Rotation(m))
}

/// Location and rotation for an entity, replaced by the zeroed/identity
/// defaults when the entity is not tracked.
fn tracked_pose(tracked: bool, loc: [f64; 3], rot: Rotation) -> ([f64; 3], Rotation) {
    if tracked {
        (loc, rot)
    } else {
        ([0.0, 0.0, 0.0], Rotation::IDENTITY)
    }
}

// ---------------------------------------------------------------------------
// record parsers
// ---------------------------------------------------------------------------

fn parse_bodies(record: &Record<'_>) -> Result<Vec<Body>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?.expect_len(2, "body id group")?;
        let (id, quality) = (head.uint(0)?, head.double(1)?);
        let loc = location(cur.next()?)?;
        let rot = rotation(cur.next()?)?;
        let (loc, rot) = tracked_pose(quality >= 0.0, loc, rot);
        out.push(Body::new(id, quality, loc, rot));
    }
    cur.finish()?;
    Ok(out)
}

fn parse_flysticks(record: &Record<'_>, with_counts: bool) -> Result<Vec<Flystick>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?;
        let declared = if with_counts {
            head.expect_len(4, "flystick id group")?;
            Some((head.uint(2)? as usize, head.uint(3)? as usize))
        } else {
            // legacy record: counts follow from the bracket contents
            head.expect_len(2, "flystick id group")?;
            None
        };
        let (id, quality) = (head.uint(0)?, head.double(1)?);
        let loc = location(cur.next()?)?;
        let rot = rotation(cur.next()?)?;
        let buttons = cur.next()?.bools()?;
        let joysticks = cur.next()?.doubles()?;
        if let Some((nbt, njt)) = declared {
            if buttons.len() != nbt || joysticks.len() != njt {
                return Err(Error::Parse(format!(
                    "{}: declared {} buttons / {} joysticks, found {} / {}",
                    record.tag,
                    nbt,
                    njt,
                    buttons.len(),
                    joysticks.len()
                )));
            }
        }
        let (loc, rot) = tracked_pose(quality >= 0.0, loc, rot);
        out.push(Flystick {
            id,
            quality,
            loc,
            rot,
            buttons,
            joysticks,
        });
    }
    cur.finish()?;
    Ok(out)
}

#[derive(Clone, Copy)]
enum ToolVariant {
    /// `6dmt`: pose only
    Plain,
    /// `6dmt2`: pose + buttons
    Buttons,
    /// `6dmt3`: pose + buttons + tip radius
    ButtonsRadius,
}

fn parse_tools(record: &Record<'_>, variant: ToolVariant) -> Result<Vec<MeasurementTool>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?;
        let (nbt, tip_radius) = match variant {
            ToolVariant::Plain => {
                head.expect_len(2, "tool id group")?;
                (None, None)
            }
            ToolVariant::Buttons => {
                head.expect_len(3, "tool id group")?;
                (Some(head.uint(2)? as usize), None)
            }
            ToolVariant::ButtonsRadius => {
                head.expect_len(4, "tool id group")?;
                (Some(head.uint(2)? as usize), Some(head.double(3)?))
            }
        };
        let (id, quality) = (head.uint(0)?, head.double(1)?);
        let loc = location(cur.next()?)?;
        let rot = rotation(cur.next()?)?;
        let buttons = match nbt {
            Some(nbt) => {
                let group = cur.next()?;
                group.expect_len(nbt, "tool buttons")?;
                group.bools()?
            }
            None => Vec::new(),
        };
        let (loc, rot) = tracked_pose(quality >= 0.0, loc, rot);
        out.push(MeasurementTool {
            id,
            quality,
            loc,
            rot,
            tip_radius,
            buttons,
        });
    }
    cur.finish()?;
    Ok(out)
}

fn parse_hands(record: &Record<'_>) -> Result<Vec<Hand>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?.expect_len(4, "hand id group")?;
        let (id, quality) = (head.uint(0)?, head.double(1)?);
        let handedness = Handedness::from_wire(head.int(2)?);
        let num_fingers = head.uint(3)? as usize;
        let loc = location(cur.next()?)?;
        let rot = rotation(cur.next()?)?;

        let mut fingers = Vec::with_capacity(num_fingers);
        for _ in 0..num_fingers {
            let floc = location(cur.next()?)?;
            let frot = rotation(cur.next()?)?;
            let geo = cur.next()?.expect_len(6, "finger geometry")?;
            fingers.push(Finger {
                loc: floc,
                rot: frot,
                tip_radius: geo.double(0)?,
                phalanx_lengths: [geo.double(1)?, geo.double(2)?, geo.double(3)?],
                phalanx_angles: [geo.double(4)?, geo.double(5)?],
            });
        }

        let (loc, rot) = tracked_pose(quality >= 0.0, loc, rot);
        out.push(Hand {
            id,
            quality,
            handedness,
            loc,
            rot,
            fingers,
        });
    }
    cur.finish()?;
    Ok(out)
}

fn parse_markers(record: &Record<'_>) -> Result<Vec<Marker>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?.expect_len(2, "marker id group")?;
        let (id, quality) = (head.uint(0)?, head.double(1)?);
        let loc = location(cur.next()?)?;
        out.push(Marker::new(id, quality, loc));
    }
    cur.finish()?;
    Ok(out)
}

fn parse_humans(record: &Record<'_>) -> Result<Vec<HumanModel>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?.expect_len(2, "human id group")?;
        let id = head.uint(0)?;
        let num_joints = head.uint(1)? as usize;

        let mut joints = Vec::with_capacity(num_joints);
        for _ in 0..num_joints {
            let jhead = cur.next()?.expect_len(2, "joint id group")?;
            let (jid, quality) = (jhead.uint(0)?, jhead.double(1)?);
            let loc = location(cur.next()?)?;
            let rot = rotation(cur.next()?)?;
            let angles = parse_joint_angles(&mut cur)?;
            let (loc, rot) = tracked_pose(quality >= 0.0, loc, rot);
            joints.push(Joint {
                id: jid,
                quality,
                loc,
                rot,
                angles,
            });
        }
        out.push(HumanModel { id, joints });
    }
    cur.finish()?;
    Ok(out)
}

/// A three-token group after a joint's rotation is its optional Euler
/// angles; a two-token group starts the next joint (or the next human).
fn parse_joint_angles(cur: &mut GroupCursor<'_, '_>) -> Result<Option<[f64; 3]>> {
    match cur.peek() {
        Some(group) if group.len() == 3 => {
            let group = cur.next()?;
            Ok(Some([group.double(0)?, group.double(1)?, group.double(2)?]))
        }
        _ => Ok(None),
    }
}

fn parse_inertial(record: &Record<'_>) -> Result<Vec<InertialBody>> {
    let count = record.head_uint(0)? as usize;
    let mut cur = record.groups();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let head = cur.next()?.expect_len(3, "hybrid body id group")?;
        let id = head.uint(0)?;
        let state = TrackingState::from_wire(head.int(1)?);
        let error = head.double(2)?;
        let loc = location(cur.next()?)?;
        let rot = rotation(cur.next()?)?;
        let (loc, rot) = tracked_pose(state != TrackingState::NotTracked, loc, rot);
        out.push(InertialBody {
            id,
            state,
            error,
            loc,
            rot,
        });
    }
    cur.finish()?;
    Ok(out)
}

fn parse_status(record: &Record<'_>) -> Result<SystemStatus> {
    let mut cur = record.groups();

    let general = cur.next()?.expect_len(3, "status counts")?;
    let num_cameras = general.uint(0)?;
    let num_tracked_bodies = general.uint(1)?;
    let num_tracked_markers = general.uint(2)?;

    let msgs = cur.next()?.expect_len(5, "status message counters")?;
    let counters = MessageCounters {
        camera_errors: msgs.uint(0)?,
        camera_warnings: msgs.uint(1)?,
        other_errors: msgs.uint(2)?,
        other_warnings: msgs.uint(3)?,
        infos: msgs.uint(4)?,
    };

    let mut cameras = Vec::with_capacity(num_cameras as usize);
    for _ in 0..num_cameras {
        let g = cur.next()?.expect_len(4, "camera status")?;
        cameras.push(CameraStatus {
            id: g.uint(0)?,
            num_reflections: g.uint(1)?,
            num_reflections_used: g.uint(2)?,
            max_intensity: g.uint(3)?,
        });
    }
    cur.finish()?;

    Ok(SystemStatus {
        num_cameras,
        num_tracked_bodies,
        num_tracked_markers,
        counters,
        cameras,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_header_fields() {
        let frame = parse_frame("fr 42\nts 12.345678\nts2 1712345678 250000\nlat 1500\n").unwrap();
        assert_eq!(frame.frame_counter, 42);
        assert_eq!(frame.timestamp, Some(12.345678));
        let ext = frame.timestamp_ext.unwrap();
        assert_eq!(ext.sec, 1712345678);
        assert_eq!(ext.usec, 250000);
        assert_eq!(frame.latency_us, Some(1500));
    }

    #[test]
    fn test_single_tracked_body() {
        let frame =
            parse_frame("fr 42\nts 12.345678\n6d 1 [0 0.950][100.0 200.0 -50.5][1 0 0 0 1 0 0 0 1]\n")
                .unwrap();
        assert_eq!(frame.frame_counter, 42);
        assert_eq!(frame.timestamp, Some(12.345678));
        assert_eq!(frame.num_bodies(), 1);
        let body = frame.body(0).unwrap();
        assert_eq!(body.id, 0);
        assert_eq!(body.quality, 0.95);
        assert!(body.is_tracked());
        assert_eq!(body.loc, [100.0, 200.0, -50.5]);
        assert_eq!(body.rot, Rotation::IDENTITY);
    }

    #[test]
    fn test_untracked_body() {
        let frame = parse_frame("6d 1 [0 -1.000][0 0 0][1 0 0 0 1 0 0 0 1]\n").unwrap();
        let body = frame.body(0).unwrap();
        assert!(!body.is_tracked());
        assert!(body.quality < 0.0);
        assert_eq!(body.loc, [0.0, 0.0, 0.0]);
        assert_eq!(body.rot, Rotation::IDENTITY);
    }

    #[test]
    fn test_untracked_body_pose_is_defaulted() {
        // even if the wire carries junk for an untracked body, readers see
        // the zeroed/identity defaults
        let frame = parse_frame("6d 1 [2 -1.0][9 9 9][2 0 0 0 2 0 0 0 2]\n").unwrap();
        let body = frame.body(0).unwrap();
        assert_eq!(body.loc, [0.0, 0.0, 0.0]);
        assert_eq!(body.rot, Rotation::IDENTITY);
    }

    #[test]
    fn test_flystick_buttons_and_joysticks() {
        let frame = parse_frame(
            "6df2 1 [0 0.8 8 2][0 0 0][1 0 0 0 1 0 0 0 1][1 0 0 0 0 0 0 0][0.50 -0.25]\n",
        )
        .unwrap();
        assert_eq!(frame.num_flysticks(), 1);
        let fly = frame.flystick(0).unwrap();
        assert_eq!(fly.buttons.len(), 8);
        assert!(fly.button(0));
        for i in 1..8 {
            assert!(!fly.button(i), "button {} unexpectedly pressed", i);
        }
        assert_eq!(fly.joysticks, vec![0.5, -0.25]);
    }

    #[test]
    fn test_flystick_declared_count_mismatch() {
        // head declares 4 buttons, group carries 2
        let r = parse_frame("6df2 1 [0 0.8 4 0][0 0 0][1 0 0 0 1 0 0 0 1][1 0][]\n");
        assert!(r.is_err());
    }

    #[test]
    fn test_legacy_flystick_counts_from_structure() {
        let frame =
            parse_frame("6df 1 [0 0.9][1 2 3][1 0 0 0 1 0 0 0 1][0 1 0 1][0.1 0.2]\n").unwrap();
        let fly = frame.flystick(0).unwrap();
        assert_eq!(fly.buttons, vec![false, true, false, true]);
        assert_eq!(fly.joysticks, vec![0.1, 0.2]);
    }

    #[test]
    fn test_measurement_tool_variants() {
        let frame = parse_frame("6dmt 1 [0 0.7][1 2 3][1 0 0 0 1 0 0 0 1]\n").unwrap();
        let tool = frame.tool(0).unwrap();
        assert_eq!(tool.tip_radius, None);
        assert!(tool.buttons.is_empty());

        let frame =
            parse_frame("6dmt2 1 [0 0.7 2][1 2 3][1 0 0 0 1 0 0 0 1][1 0]\n").unwrap();
        let tool = frame.tool(0).unwrap();
        assert_eq!(tool.tip_radius, None);
        assert_eq!(tool.buttons, vec![true, false]);

        let frame =
            parse_frame("6dmt3 1 [0 0.7 2 1.25][1 2 3][1 0 0 0 1 0 0 0 1][0 1]\n").unwrap();
        let tool = frame.tool(0).unwrap();
        assert_eq!(tool.tip_radius, Some(1.25));
        assert_eq!(tool.buttons, vec![false, true]);
    }

    #[test]
    fn test_measurement_references() {
        let frame = parse_frame("6dmtr 1 [0 1.0][5 6 7][1 0 0 0 1 0 0 0 1]\n").unwrap();
        assert_eq!(frame.num_references(), 1);
        assert_eq!(frame.references[0].loc, [5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_hand_with_fingers() {
        let buf = "gl 1 [0 0.9 1 2][10 20 30][1 0 0 0 1 0 0 0 1]\
                   [1 1 1][1 0 0 0 1 0 0 0 1][8.0 30.0 25.0 20.0 10.0 15.0]\
                   [2 2 2][1 0 0 0 1 0 0 0 1][7.5 28.0 24.0 19.0 12.0 14.0]\n";
        let frame = parse_frame(buf).unwrap();
        assert_eq!(frame.num_hands(), 1);
        let hand = frame.hand(0).unwrap();
        assert_eq!(hand.handedness, Handedness::Right);
        assert_eq!(hand.num_fingers(), 2);
        let finger = &hand.fingers[0];
        assert_eq!(finger.tip_radius, 8.0);
        assert_eq!(finger.phalanx_lengths, [30.0, 25.0, 20.0]);
        assert_eq!(finger.phalanx_angles, [10.0, 15.0]);
    }

    #[test]
    fn test_markers_with_sparse_ids() {
        let frame =
            parse_frame("3d 2 [3 0.9][1 2 3] [17 0.8][4 5 6]\n").unwrap();
        assert_eq!(frame.num_markers(), 2);
        assert_eq!(frame.marker(17).unwrap().loc, [4.0, 5.0, 6.0]);
        assert!(frame.marker(4).is_none());
    }

    #[test]
    fn test_human_model_with_and_without_angles() {
        let buf = "human 1 [0 2]\
                   [5 0.9][1 2 3][1 0 0 0 1 0 0 0 1][10 20 30]\
                   [6 0.8][4 5 6][1 0 0 0 1 0 0 0 1]\n";
        let frame = parse_frame(buf).unwrap();
        assert_eq!(frame.num_humans(), 1);
        let human = frame.human(0).unwrap();
        assert_eq!(human.num_joints(), 2);
        assert_eq!(human.joint(5).unwrap().angles, Some([10.0, 20.0, 30.0]));
        assert_eq!(human.joint(6).unwrap().angles, None);
    }

    #[test]
    fn test_inertial_bodies() {
        let frame = parse_frame(
            "6di 2 [0 3 0.1][1 2 3][1 0 0 0 1 0 0 0 1] [5 0 0.0][0 0 0][1 0 0 0 1 0 0 0 1]\n",
        )
        .unwrap();
        assert_eq!(frame.num_inertial_bodies(), 2);
        let tracked = frame.inertial_body(0).unwrap();
        assert_eq!(tracked.state, TrackingState::HybridCorrected);
        assert!(tracked.is_tracked());
        assert_eq!(tracked.error, 0.1);
        let lost = frame.inertial_body(5).unwrap();
        assert!(!lost.is_tracked());
    }

    #[test]
    fn test_status_record() {
        let frame = parse_frame(
            "status [2 3 8][0 1 0 2 5] [0 12 10 7][1 15 14 9]\n",
        )
        .unwrap();
        let status = frame.status.unwrap();
        assert_eq!(status.num_cameras, 2);
        assert_eq!(status.num_tracked_bodies, 3);
        assert_eq!(status.num_tracked_markers, 8);
        assert_eq!(status.counters.camera_warnings, 1);
        assert_eq!(status.counters.infos, 5);
        assert_eq!(status.cameras.len(), 2);
        let cam = status.camera(1).unwrap();
        assert_eq!(cam.num_reflections, 15);
        assert_eq!(cam.num_reflections_used, 14);
        assert_eq!(cam.max_intensity, 9);
    }

    #[test]
    fn test_malformed_status_is_dropped_not_fatal() {
        // camera count says 2 but only one camera group follows
        let frame = parse_frame("fr 9\nstatus [2 0 0][0 0 0 0 0] [0 1 1 1]\n").unwrap();
        assert_eq!(frame.frame_counter, 9);
        assert!(frame.status.is_none());
    }

    #[test]
    fn test_malformed_timestamp_is_dropped_not_fatal() {
        let frame = parse_frame("fr 9\nts\n6d 1 [0 1.0][0 0 0][1 0 0 0 1 0 0 0 1]\n").unwrap();
        assert_eq!(frame.frame_counter, 9);
        assert_eq!(frame.timestamp, None);
        assert_eq!(frame.num_bodies(), 1);
    }

    #[test]
    fn test_unknown_tags_only_yields_empty_frame() {
        let frame = parse_frame("6dcal 4\nglcal 2 [1 2][3 4]\nexotic 1 [0 0 0]\n").unwrap();
        assert_eq!(frame, Frame::default());
    }

    #[test]
    fn test_unknown_tag_between_known_records() {
        let frame =
            parse_frame("fr 7\n6dcal 12\n6d 1 [0 1.0][0 0 0][1 0 0 0 1 0 0 0 1]\n").unwrap();
        assert_eq!(frame.frame_counter, 7);
        assert_eq!(frame.num_bodies(), 1);
    }

    #[test]
    fn test_declared_count_too_large_is_fatal() {
        assert!(parse_frame("6d 2 [0 1.0][0 0 0][1 0 0 0 1 0 0 0 1]\n").is_err());
    }

    #[test]
    fn test_declared_count_too_small_is_fatal() {
        assert!(parse_frame(
            "6d 1 [0 1.0][0 0 0][1 0 0 0 1 0 0 0 1][1 1.0][0 0 0][1 0 0 0 1 0 0 0 1]\n"
        )
        .is_err());
    }

    #[test]
    fn test_non_numeric_required_field_is_fatal() {
        assert!(parse_frame("6d 1 [0 high][0 0 0][1 0 0 0 1 0 0 0 1]\n").is_err());
        assert!(parse_frame("fr x7\n").is_err());
    }

    #[test]
    fn test_truncated_group_is_fatal() {
        assert!(parse_frame("6d 1 [0 1.0][0 0 0][1 0 0 0 1 0 0 0\n").is_err());
    }

    #[test]
    fn test_declared_counts_match_sequence_lengths() {
        let buf = "fr 1\n\
                   6d 2 [0 1.0][0 0 0][1 0 0 0 1 0 0 0 1] [1 1.0][0 0 0][1 0 0 0 1 0 0 0 1]\n\
                   3d 3 [0 1.0][1 1 1] [1 1.0][2 2 2] [2 1.0][3 3 3]\n\
                   6di 1 [0 1 0.0][0 0 0][1 0 0 0 1 0 0 0 1]\n";
        let frame = parse_frame(buf).unwrap();
        assert_eq!(frame.num_bodies(), 2);
        assert_eq!(frame.num_markers(), 3);
        assert_eq!(frame.num_inertial_bodies(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let frame = parse_frame("fr 3\r\nts 1.5\r\n").unwrap();
        assert_eq!(frame.frame_counter, 3);
        assert_eq!(frame.timestamp, Some(1.5));
    }

    #[test]
    fn test_records_share_one_line() {
        let frame = parse_frame("fr 11 ts 2.5 lat 800\n").unwrap();
        assert_eq!(frame.frame_counter, 11);
        assert_eq!(frame.timestamp, Some(2.5));
        assert_eq!(frame.latency_us, Some(800));
    }
}
