//! Classification of one command exchange

/// Result of sending one `dtrack2` command over the TCP session.
///
/// Every exchange ends in exactly one of these; `Transport` additionally
/// means the TCP session is dead and must not be used again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseClass {
    /// Reply was `dtrack2 ok`
    Ok,
    /// Reply was `dtrack2 err <code> "<message>"`; the controller refused
    /// the command
    DtrackErr { code: i32, message: String },
    /// Any other well-formed reply, to be interpreted by the caller
    /// (e.g. the `dtrack2 set ...` echo of a get request)
    Payload(String),
    /// No reply within the command timeout
    Timeout,
    /// Socket closed or failed; the command interface is dead
    Transport,
    /// Outbound command exceeded the protocol's length bound; nothing was
    /// written to the socket
    TooLong,
    /// Reply could not be tokenized
    Malformed,
}

impl ResponseClass {
    /// Parse a complete reply string (NULs already stripped) into its
    /// class. Transport-level outcomes are produced by the session, not
    /// here.
    pub fn classify(reply: &str) -> ResponseClass {
        if reply.starts_with("dtrack2 ok") {
            return ResponseClass::Ok;
        }
        if let Some(rest) = reply.strip_prefix("dtrack2 err ") {
            return parse_err_reply(rest).unwrap_or(ResponseClass::Malformed);
        }
        ResponseClass::Payload(reply.to_string())
    }
}

/// `<code> "<message>"`, code in decimal
fn parse_err_reply(rest: &str) -> Option<ResponseClass> {
    let rest = rest.trim_start();
    let code_end = rest.find(' ')?;
    let code = rest[..code_end].parse::<i32>().ok()?;

    let open = rest.find('"')?;
    let close = rest[open + 1..].find('"')? + open + 1;
    let message = rest[open + 1..close].to_string();

    Some(ResponseClass::DtrackErr { code, message })
}
