//! printf / os_log style format strings.
//!
//! Used by the legacy `log_format` surface and by sinks that decode native
//! format tokens back into text.

use crate::message::argument::ArgValue;
use crate::message::privacy::Privacy;

/// One parsed placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub privacy: Privacy,
    pub precision: Option<usize>,
    pub conversion: char,
}

impl FormatSpec {
    /// Convert `value` according to this placeholder.
    pub fn apply(&self, value: &ArgValue) -> ArgValue {
        match (self.conversion, value) {
            ('x', ArgValue::Int(v)) => ArgValue::Str(format!("{v:x}")),
            ('x', ArgValue::UInt(v)) => ArgValue::Str(format!("{v:x}")),
            ('X', ArgValue::Int(v)) => ArgValue::Str(format!("{v:X}")),
            ('X', ArgValue::UInt(v)) => ArgValue::Str(format!("{v:X}")),
            ('f' | 'g' | 'e', ArgValue::Float(v)) => match self.precision {
                Some(p) => ArgValue::Str(format!("{v:.p$}")),
                None => value.clone(),
            },
            ('f' | 'g' | 'e', ArgValue::Int(v)) => ArgValue::Float(*v as f64),
            ('d' | 'i', ArgValue::Bool(v)) => ArgValue::Int(i64::from(*v)),
            ('d' | 'i', ArgValue::Float(v)) => ArgValue::Int(*v as i64),
            ('s' | '@', ArgValue::Str(s)) => match self.precision {
                Some(p) => ArgValue::Str(s.chars().take(p).collect()),
                None => value.clone(),
            },
            _ => value.clone(),
        }
    }
}

/// A piece of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment {
    Literal(String),
    Placeholder(FormatSpec),
}

const CONVERSIONS: &[char] = &['d', 'i', 'u', 'x', 'X', 'f', 'g', 'e', 's', '@', 'c'];
const LENGTH_MODIFIERS: &[char] = &['l', 'h', 'z', 'q', 'j', 't'];

/// Split a format string into literals and placeholders.
///
/// Malformed placeholders are kept as literal text.
pub fn parse(format: &str) -> Vec<FormatSegment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = format;

    while let Some(pos) = rest.find('%') {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('%') {
            literal.push('%');
            rest = after;
            continue;
        }

        match parse_placeholder(tail) {
            Some((spec, consumed)) => {
                if !literal.is_empty() {
                    segments.push(FormatSegment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(FormatSegment::Placeholder(spec));
                rest = &tail[consumed..];
            }
            None => {
                literal.push('%');
                rest = tail;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(FormatSegment::Literal(literal));
    }
    segments
}

fn parse_placeholder(tail: &str) -> Option<(FormatSpec, usize)> {
    let mut consumed = 0;
    let mut privacy = Privacy::PUBLIC;

    if let Some(inner) = tail.strip_prefix('{') {
        let close = inner.find('}')?;
        privacy = Privacy::from_specifier(&inner[..close]);
        consumed += close + 2;
    }

    let mut precision = None;
    let body = &tail[consumed..];
    if let Some(digits_start) = body.strip_prefix('.') {
        let digits: String = digits_start.chars().take_while(char::is_ascii_digit).collect();
        precision = Some(digits.parse().unwrap_or(0));
        consumed += 1 + digits.len();
    }

    for c in tail[consumed..].chars() {
        if LENGTH_MODIFIERS.contains(&c) {
            consumed += c.len_utf8();
            continue;
        }
        if CONVERSIONS.contains(&c) {
            return Some((
                FormatSpec {
                    privacy,
                    precision,
                    conversion: c,
                },
                consumed + c.len_utf8(),
            ));
        }
        return None;
    }
    None
}
