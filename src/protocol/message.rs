//! Event messages retrieved with `dtrack2 getmsg`

/// One controller event message
///
/// Wire form: `dtrack2 msg <origin> <status> <frame> 0x<errcode> "<text>"`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventMessage {
    /// Component the message originates from (e.g. `cam`)
    pub origin: String,
    /// Severity word (e.g. `ok`, `err`)
    pub status: String,
    /// Frame counter at the time of the event
    pub frame_nr: u32,
    /// Controller error id (transmitted in hexadecimal)
    pub error_id: u32,
    /// Human-readable message text
    pub message: String,
}

impl EventMessage {
    /// Parse one `dtrack2 msg` reply. `None` for anything else, including
    /// the empty reply sent when no message is pending.
    pub fn parse(reply: &str) -> Option<EventMessage> {
        let rest = reply.strip_prefix("dtrack2 msg ")?;

        let mut words = rest.splitn(4, ' ');
        let origin = non_empty(words.next()?)?;
        let status = non_empty(words.next()?)?;
        let frame_nr = words.next()?.parse::<u32>().ok()?;
        let tail = words.next()?;

        let hex = tail.trim_start().strip_prefix("0x")?;
        let hex_end = hex.find(' ')?;
        let error_id = u32::from_str_radix(&hex[..hex_end], 16).ok()?;

        let text = &hex[hex_end..];
        let open = text.find('"')?;
        let close = text[open + 1..].find('"')? + open + 1;
        let message = text[open + 1..close].to_string();

        Some(EventMessage {
            origin: origin.to_string(),
            status: status.to_string(),
            frame_nr,
            error_id,
            message,
        })
    }
}

fn non_empty(word: &str) -> Option<&str> {
    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message() {
        let msg = EventMessage::parse("dtrack2 msg cam ok 17 0x000000a3 \"lens dirty\"").unwrap();
        assert_eq!(msg.origin, "cam");
        assert_eq!(msg.status, "ok");
        assert_eq!(msg.frame_nr, 17);
        assert_eq!(msg.error_id, 0xa3);
        assert_eq!(msg.message, "lens dirty");
    }

    #[test]
    fn test_parse_rejects_other_replies() {
        assert!(EventMessage::parse("dtrack2 ok").is_none());
        assert!(EventMessage::parse("").is_none());
        assert!(EventMessage::parse("dtrack2 msg cam").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert!(EventMessage::parse("dtrack2 msg cam ok x 0x1 \"m\"").is_none());
        assert!(EventMessage::parse("dtrack2 msg cam ok 1 0xzz \"m\"").is_none());
    }
}
