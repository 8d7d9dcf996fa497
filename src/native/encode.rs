//! Format token and argument buffer for native sinks.
//!
//! # Buffer Layout
//! ```text
//! [summary flags: u8] [item count: u8] item*
//! item = [descriptor: u8] [payload length: u16 LE] [payload]
//! descriptor = kind << 4 | privacy flag
//! ```
//!
//! Kinds: signed 0 (i64 LE), unsigned 1 (u64 LE), string 2 (UTF-8),
//! float 3 (f64 LE), bool 4 (one byte), mask 7 (u64 LE mask id).
//! Privacy flags: private 0x1, public 0x2, auto 0x0.
//! Summary flags: 0x1 some argument is private or masked, 0x2 some argument
//! is not a scalar.

use crate::error::NativeSinkError;
use crate::message::argument::ArgValue;
use crate::message::render::UNRENDERABLE;
use crate::message::{InterpolatedMessage, Privacy, PrivacyLevel};

/// Upper bound on encoded items.
pub const MAX_ITEMS: usize = u8::MAX as usize;

/// The ASCII bytes "hash" read as a little-endian integer.
pub const HASH_MASK_ID: u64 = 1_752_392_040;

const FLAG_HAS_PRIVATE: u8 = 0x1;
const FLAG_HAS_NON_SCALAR: u8 = 0x2;

/// Kind nibble of an item descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ItemKind {
    Signed = 0,
    Unsigned = 1,
    String = 2,
    Float = 3,
    Bool = 4,
    Mask = 7,
}

impl TryFrom<u8> for ItemKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(ItemKind::Signed),
            1 => Ok(ItemKind::Unsigned),
            2 => Ok(ItemKind::String),
            3 => Ok(ItemKind::Float),
            4 => Ok(ItemKind::Bool),
            7 => Ok(ItemKind::Mask),
            other => Err(other),
        }
    }
}

/// A message prepared for a native facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeMessage {
    pub format: String,
    pub buffer: Vec<u8>,
}

impl NativeMessage {
    /// Evaluate every argument of `message` and encode it.
    pub fn encode(message: &InterpolatedMessage<'_>) -> Self {
        let mut encoder = Encoder::default();
        let fragments = message.fragments();
        let arguments = message.arguments();

        for (index, fragment) in fragments.iter().enumerate() {
            encoder.literal(fragment);
            if let Some(argument) = arguments.get(index) {
                encoder.argument(argument.privacy(), argument.evaluate().ok());
            }
        }
        for argument in arguments.iter().skip(fragments.len()) {
            if !encoder.format.is_empty() {
                encoder.format.push(' ');
            }
            encoder.argument(argument.privacy(), argument.evaluate().ok());
        }

        encoder.finish()
    }
}

#[derive(Default)]
struct Encoder {
    format: String,
    items: Vec<u8>,
    count: usize,
    flags: u8,
    dropped: usize,
}

impl Encoder {
    fn literal(&mut self, text: &str) {
        for c in text.chars() {
            if c == '%' {
                self.format.push_str("%%");
            } else {
                self.format.push(c);
            }
        }
    }

    fn argument(&mut self, privacy: Privacy, value: Option<ArgValue>) {
        let value = value.unwrap_or_else(|| ArgValue::Str(UNRENDERABLE.to_string()));
        let needed = if privacy.has_mask() { 2 } else { 1 };
        if self.count + needed > MAX_ITEMS {
            self.dropped += 1;
            return;
        }

        self.format.push('%');
        if let Some(spec) = privacy.specifier() {
            self.format.push('{');
            self.format.push_str(spec);
            self.format.push('}');
        }
        self.format.push_str(conversion(&value));

        let flag = privacy.argument_flag();
        if privacy.level != PrivacyLevel::Public || privacy.has_mask() {
            self.flags |= FLAG_HAS_PRIVATE;
        }
        if privacy.has_mask() {
            self.item(ItemKind::Mask, flag, &HASH_MASK_ID.to_le_bytes());
        }
        match &value {
            ArgValue::Int(v) => self.item(ItemKind::Signed, flag, &v.to_le_bytes()),
            ArgValue::UInt(v) => self.item(ItemKind::Unsigned, flag, &v.to_le_bytes()),
            ArgValue::Float(v) => self.item(ItemKind::Float, flag, &v.to_le_bytes()),
            ArgValue::Bool(v) => self.item(ItemKind::Bool, flag, &[u8::from(*v)]),
            ArgValue::Str(s) => {
                self.flags |= FLAG_HAS_NON_SCALAR;
                let bytes = truncate_utf8(s, u16::MAX as usize);
                self.item(ItemKind::String, flag, bytes);
            }
        }
    }

    fn item(&mut self, kind: ItemKind, flag: u8, payload: &[u8]) {
        self.items.push(((kind as u8) << 4) | flag);
        self.items
            .extend_from_slice(&(payload.len() as u16).to_le_bytes());
        self.items.extend_from_slice(payload);
        self.count += 1;
    }

    fn finish(self) -> NativeMessage {
        if self.dropped > 0 {
            tracing::warn!(dropped = self.dropped, "native message exceeded item limit");
        }
        let mut buffer = Vec::with_capacity(self.items.len() + 2);
        buffer.push(self.flags);
        buffer.push(self.count as u8);
        buffer.extend_from_slice(&self.items);
        NativeMessage {
            format: self.format,
            buffer,
        }
    }
}

fn conversion(value: &ArgValue) -> &'static str {
    match value {
        ArgValue::Int(_) => "lld",
        ArgValue::UInt(_) => "llu",
        ArgValue::Float(_) => "f",
        ArgValue::Bool(_) => "d",
        ArgValue::Str(_) => "s",
    }
}

fn truncate_utf8(s: &str, max: usize) -> &[u8] {
    if s.len() <= max {
        return s.as_bytes();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s.as_bytes()[..end]
}

/// One decoded buffer item.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedItem {
    pub kind: ItemKind,
    pub privacy_flag: u8,
    pub value: Option<ArgValue>,
}

impl DecodedItem {
    pub fn is_private(&self) -> bool {
        self.privacy_flag == 0x1
    }
}

/// Parse an argument buffer produced by [`NativeMessage::encode`].
pub fn decode_buffer(buffer: &[u8]) -> Result<Vec<DecodedItem>, NativeSinkError> {
    let truncated = |offset| NativeSinkError::Decode {
        offset,
        reason: "truncated",
    };

    if buffer.len() < 2 {
        return Err(truncated(buffer.len()));
    }
    let count = buffer[1] as usize;
    let mut items = Vec::with_capacity(count);
    let mut pos = 2;

    for _ in 0..count {
        let header = *buffer.get(pos).ok_or_else(|| truncated(pos))?;
        let kind = ItemKind::try_from(header >> 4).map_err(|_| NativeSinkError::Decode {
            offset: pos,
            reason: "unknown item kind",
        })?;
        let len_bytes = buffer.get(pos + 1..pos + 3).ok_or_else(|| truncated(pos + 1))?;
        let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        let payload = buffer
            .get(pos + 3..pos + 3 + len)
            .ok_or_else(|| truncated(pos + 3))?;

        let value = decode_value(kind, payload).ok_or(NativeSinkError::Decode {
            offset: pos + 3,
            reason: "bad payload",
        })?;
        items.push(DecodedItem {
            kind,
            privacy_flag: header & 0x0f,
            value,
        });
        pos += 3 + len;
    }

    Ok(items)
}

fn decode_value(kind: ItemKind, payload: &[u8]) -> Option<Option<ArgValue>> {
    let eight = || -> Option<[u8; 8]> { payload.try_into().ok() };
    Some(match kind {
        ItemKind::Signed => Some(ArgValue::Int(i64::from_le_bytes(eight()?))),
        ItemKind::Unsigned => Some(ArgValue::UInt(u64::from_le_bytes(eight()?))),
        ItemKind::Float => Some(ArgValue::Float(f64::from_le_bytes(eight()?))),
        ItemKind::Bool => Some(ArgValue::Bool(*payload.first()? != 0)),
        ItemKind::String => Some(ArgValue::Str(String::from_utf8(payload.to_vec()).ok()?)),
        ItemKind::Mask => {
            eight()?;
            None
        }
    })
}
