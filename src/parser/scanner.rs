//! Lexical layer of the measurement-frame parser
//!
//! A record is a lowercase tag, optional numeric head tokens, then zero or
//! more bracketed groups `[ ... ]`. Records are usually one per line but
//! may also follow each other on the same line, separated by whitespace: a
//! non-numeric token after a record's head or groups starts the next
//! record. The scanner splits the input into these parts without
//! interpreting them; the record parsers in the parent module assign
//! meaning.
//!
//! All numeric parsing goes through the helpers at the bottom, which rely
//! on `str::parse` and therefore always use `.` as the decimal separator,
//! independent of the host locale.

use crate::error::{Error, Result};

/// One bracketed group, split into whitespace-separated tokens
#[derive(Debug)]
pub struct Group<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Group<'a> {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn token(&self, index: usize) -> Result<&'a str> {
        self.tokens
            .get(index)
            .copied()
            .ok_or_else(|| parse_err(format!("group too short, no field {}", index)))
    }

    pub fn int(&self, index: usize) -> Result<i64> {
        parse_int(self.token(index)?)
    }

    pub fn uint(&self, index: usize) -> Result<u32> {
        parse_uint(self.token(index)?)
    }

    pub fn double(&self, index: usize) -> Result<f64> {
        parse_double(self.token(index)?)
    }

    /// All tokens as doubles
    pub fn doubles(&self) -> Result<Vec<f64>> {
        self.tokens.iter().map(|t| parse_double(t)).collect()
    }

    /// All tokens as booleans (nonzero integer = true)
    pub fn bools(&self) -> Result<Vec<bool>> {
        self.tokens.iter().map(|t| Ok(parse_int(t)? != 0)).collect()
    }

    /// Require an exact token count before field access
    pub fn expect_len(&self, len: usize, what: &str) -> Result<&Self> {
        if self.tokens.len() != len {
            return Err(parse_err(format!(
                "{}: expected {} fields, found {}",
                what,
                len,
                self.tokens.len()
            )));
        }
        Ok(self)
    }
}

/// One scanned record: tag, head tokens, bracketed groups
#[derive(Debug)]
pub struct Record<'a> {
    pub tag: &'a str,
    head: Vec<&'a str>,
    groups: Vec<Group<'a>>,
}

impl<'a> Record<'a> {
    pub fn num_head(&self) -> usize {
        self.head.len()
    }

    fn head_token(&self, index: usize) -> Result<&'a str> {
        self.head
            .get(index)
            .copied()
            .ok_or_else(|| parse_err(format!("{}: missing head field {}", self.tag, index)))
    }

    pub fn head_uint(&self, index: usize) -> Result<u32> {
        parse_uint(self.head_token(index)?)
    }

    pub fn head_u64(&self, index: usize) -> Result<u64> {
        let token = self.head_token(index)?;
        token
            .parse::<u64>()
            .map_err(|_| parse_err(format!("not an unsigned integer: {:?}", token)))
    }

    pub fn head_double(&self, index: usize) -> Result<f64> {
        parse_double(self.head_token(index)?)
    }

    /// Cursor over the bracketed groups, in transmission order
    pub fn groups(&self) -> GroupCursor<'_, 'a> {
        GroupCursor {
            tag: self.tag,
            groups: &self.groups,
            next: 0,
        }
    }
}

/// Sequential reader over a record's groups
pub struct GroupCursor<'r, 'a> {
    tag: &'a str,
    groups: &'r [Group<'a>],
    next: usize,
}

impl<'r, 'a> GroupCursor<'r, 'a> {
    /// Take the next group; running out means the declared count and the
    /// delimiter structure disagree.
    pub fn next(&mut self) -> Result<&'r Group<'a>> {
        let group = self.groups.get(self.next).ok_or_else(|| {
            parse_err(format!(
                "{}: record ends after {} groups",
                self.tag, self.next
            ))
        })?;
        self.next += 1;
        Ok(group)
    }

    /// Group that `next()` would return, without consuming it
    pub fn peek(&self) -> Option<&'r Group<'a>> {
        self.groups.get(self.next)
    }

    pub fn remaining(&self) -> usize {
        self.groups.len() - self.next
    }

    /// All groups must have been consumed; leftovers mean the declared
    /// count was smaller than the transmitted structure.
    pub fn finish(&self) -> Result<()> {
        if self.next != self.groups.len() {
            return Err(parse_err(format!(
                "{}: {} unconsumed groups after declared count",
                self.tag,
                self.groups.len() - self.next
            )));
        }
        Ok(())
    }
}

/// Scan one record from the input and return it together with the
/// unconsumed remainder (the next record on the same line, if any).
///
/// The head ends at the first `[`, at a non-numeric token (the next
/// record's tag) or at the end of input. A group without its closing `]`
/// counts as a truncated record.
pub fn scan_record(input: &str) -> Result<(Record<'_>, &str)> {
    let mut rest = input.trim_start();

    let end = token_end(rest);
    if end == 0 {
        return Err(parse_err(format!(
            "expected record tag, found {:?}",
            rest.chars().next().map(String::from).unwrap_or_default()
        )));
    }
    let tag = &rest[..end];
    rest = &rest[end..];

    let mut head = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('[') {
            break;
        }
        let end = token_end(rest);
        let token = &rest[..end];
        if token.parse::<f64>().is_err() {
            break; // next record's tag
        }
        head.push(token);
        rest = &rest[end..];
    }

    let mut groups = Vec::new();
    loop {
        rest = rest.trim_start();
        if !rest.starts_with('[') {
            break;
        }
        let close = rest
            .find(']')
            .ok_or_else(|| parse_err(format!("{}: truncated group", tag)))?;
        groups.push(Group {
            tokens: rest[1..close].split_ascii_whitespace().collect(),
        });
        rest = &rest[close + 1..];
    }

    Ok((Record { tag, head, groups }, rest))
}

/// Tag of the next record in the input, without scanning the rest. Used to
/// decide whether a record is known before spending any effort on it, and
/// to classify scan failures.
pub fn peek_tag(input: &str) -> Option<&str> {
    let rest = input.trim_start();
    let end = token_end(rest);
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

fn token_end(s: &str) -> usize {
    s.find(|c: char| c.is_ascii_whitespace() || c == '[')
        .unwrap_or(s.len())
}

pub fn parse_double(token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| parse_err(format!("not a number: {:?}", token)))
}

pub fn parse_int(token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| parse_err(format!("not an integer: {:?}", token)))
}

pub fn parse_uint(token: &str) -> Result<u32> {
    token
        .parse::<u32>()
        .map_err(|_| parse_err(format!("not an unsigned integer: {:?}", token)))
}

fn parse_err(msg: String) -> Error {
    Error::Parse(msg)
}
