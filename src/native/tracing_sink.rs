//! Native sink that lands in the `tracing` ecosystem.
//!
//! Decodes the format token and argument buffer back into text, applying
//! its own disclosure policy, and emits one `tracing` event per record.

use crate::error::NativeSinkError;
use crate::event::{CorrelationId, SignpostKind};
use crate::level::LogLevel;
use crate::message::format::{self, FormatSegment};
use crate::message::render::mask_digest;
use crate::message::{DisclosurePolicy, Privacy, PrivacyLevel};
use crate::native::encode::{decode_buffer, DecodedItem, ItemKind};
use crate::native::{NativeMessage, NativeSink};

/// Placeholder the sink writes for withheld values.
pub const WITHHELD: &str = "<private>";

/// Handle issued by [`TracingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingHandle {
    pub subsystem: String,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    policy: DisclosurePolicy,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DisclosurePolicy) -> Self {
        Self { policy }
    }

    /// Rebuild readable text from an encoded message.
    pub fn reconstruct(&self, message: &NativeMessage) -> Result<String, NativeSinkError> {
        let items = decode_buffer(&message.buffer)?;
        let mut items = items.into_iter();
        let mut out = String::with_capacity(message.format.len());

        for segment in format::parse(&message.format) {
            match segment {
                FormatSegment::Literal(text) => out.push_str(&text),
                FormatSegment::Placeholder(spec) => {
                    let mut item = items.next();
                    if matches!(item, Some(DecodedItem { kind: ItemKind::Mask, .. })) {
                        item = items.next();
                    }
                    let Some(DecodedItem {
                        value: Some(value),
                        privacy_flag,
                        ..
                    }) = item
                    else {
                        return Err(NativeSinkError::Decode {
                            offset: message.buffer.len(),
                            reason: "placeholder without argument",
                        });
                    };

                    let privacy = Privacy {
                        level: level_from_flag(privacy_flag),
                        mask: spec.privacy.mask,
                    };
                    if !privacy.is_hidden_under(&self.policy) {
                        out.push_str(&value.to_string());
                    } else if privacy.has_mask() {
                        out.push_str(&mask_digest(&value, &self.policy.mask_salt));
                    } else {
                        out.push_str(WITHHELD);
                    }
                }
            }
        }

        Ok(out)
    }
}

fn level_from_flag(flag: u8) -> PrivacyLevel {
    match flag {
        0x1 => PrivacyLevel::Private,
        0x2 => PrivacyLevel::Public,
        _ => PrivacyLevel::Auto,
    }
}

impl NativeSink for TracingSink {
    type Handle = TracingHandle;

    fn open_handle(&self, subsystem: &str, category: &str) -> Result<TracingHandle, NativeSinkError> {
        Ok(TracingHandle {
            subsystem: subsystem.to_string(),
            category: category.to_string(),
        })
    }

    fn emit(&self, handle: &TracingHandle, level: LogLevel, message: &NativeMessage) -> Result<(), NativeSinkError> {
        let text = self.reconstruct(message)?;
        let subsystem = handle.subsystem.as_str();
        let category = handle.category.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(subsystem, category, "{text}"),
            LogLevel::Info => tracing::info!(subsystem, category, "{text}"),
            LogLevel::Warn => tracing::warn!(subsystem, category, "{text}"),
            LogLevel::Error => tracing::error!(subsystem, category, "{text}"),
            LogLevel::Fault => tracing::error!(subsystem, category, fault = true, "{text}"),
        }
        Ok(())
    }

    fn emit_signpost(
        &self,
        handle: &TracingHandle,
        kind: SignpostKind,
        id: CorrelationId,
        name: &str,
        _message: Option<&NativeMessage>,
    ) -> Result<(), NativeSinkError> {
        tracing::trace!(
            subsystem = handle.subsystem.as_str(),
            category = handle.category.as_str(),
            signpost = kind.label(),
            id = %id,
            name,
            "signpost"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Mask;

    #[test]
    fn test_reconstruct_withholds_private() {
        let user = "ada";
        let count = 3i64;
        let message = crate::message!("100% of " {user; Privacy::PRIVATE} " sent " {count});
        let native = NativeMessage::encode(&message);

        let closed = TracingSink::new();
        assert_eq!(closed.reconstruct(&native).unwrap(), "100% of <private> sent 3");

        let open = TracingSink::with_policy(DisclosurePolicy::disclose_all());
        assert_eq!(open.reconstruct(&native).unwrap(), "100% of ada sent 3");
    }

    #[test]
    fn test_reconstruct_masks_like_renderer() {
        let email = "a@b.c";
        let message = crate::message!("mail " {email; Privacy::private_masked(Mask::Hash)});
        let native = NativeMessage::encode(&message);

        let sink = TracingSink::new();
        let expected = message.render(&DisclosurePolicy::default());
        assert_eq!(sink.reconstruct(&native).unwrap(), expected);
        assert!(expected.starts_with("mail <mask.hash: '"));
    }

    #[test]
    fn test_emit_through_subscriber() {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().finish(),
        );
        let sink = TracingSink::new();
        let handle = sink.open_handle("app", "Net").unwrap();
        let native = NativeMessage::encode(&crate::InterpolatedMessage::literal("up"));
        for level in LogLevel::ALL {
            assert!(sink.emit(&handle, level, &native).is_ok());
        }
    }

    #[test]
    fn test_reconstruct_rejects_short_buffer() {
        let broken = NativeMessage {
            format: "%lld".into(),
            buffer: vec![0, 0],
        };
        assert!(TracingSink::new().reconstruct(&broken).is_err());
    }

    #[test]
    fn test_auto_follows_buffer_flag() {
        let v = 9u64;
        let message = crate::message!("v=" {v; Privacy::AUTO});
        let native = NativeMessage::encode(&message);
        assert_eq!(TracingSink::new().reconstruct(&native).unwrap(), "v=<private>");
    }
}
