//! Rendering interpolated messages to text.
//!
//! # Responsibilities
//! - Walk fragments and arguments in lockstep
//! - Apply the disclosure policy per argument (redact, mask or reveal)
//! - Contain argument failures to a per-argument placeholder
//!
//! # Design Decisions
//! - Rendering borrows the message, so one message can be rendered under
//!   several policies (one per driver)
//! - Hidden unmasked arguments are never evaluated

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::message::argument::{ArgValue, Argument};
use crate::message::interpolated::InterpolatedMessage;
use crate::message::privacy::DisclosurePolicy;

/// Emitted in place of a hidden argument.
pub const REDACTED: &str = "{private}";

/// Emitted in place of an argument that failed to produce a value.
pub const UNRENDERABLE: &str = "{unrenderable}";

/// Render `message` under `policy`.
pub fn render(message: &InterpolatedMessage<'_>, policy: &DisclosurePolicy) -> String {
    let fragments = message.fragments();
    let arguments = message.arguments();
    let mut out = String::with_capacity(fragments.iter().map(|f| f.len()).sum::<usize>() + 16);

    for (index, fragment) in fragments.iter().enumerate() {
        out.push_str(fragment);
        if let Some(argument) = arguments.get(index) {
            out.push_str(&render_argument(argument, policy));
        }
    }

    for argument in arguments.iter().skip(fragments.len()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&render_argument(argument, policy));
    }

    out
}

/// Render one argument under `policy`.
pub fn render_argument(argument: &Argument<'_>, policy: &DisclosurePolicy) -> String {
    let privacy = argument.privacy();
    if privacy.is_hidden_under(policy) && !privacy.has_mask() {
        return REDACTED.to_string();
    }

    match argument.evaluate() {
        Ok(value) if privacy.is_hidden_under(policy) => mask_digest(&value, &policy.mask_salt),
        Ok(value) => value.to_string(),
        Err(err) => {
            tracing::debug!(error = %err, "argument rendered as placeholder");
            UNRENDERABLE.to_string()
        }
    }
}

/// Stable digest standing in for a masked value.
///
/// Equal (salt, value) pairs always produce the same text. The value kind is
/// part of the input, so `4` and `"4"` mask differently.
pub fn mask_digest(value: &ArgValue, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update([0u8, value.kind_tag()]);
    hasher.update(value.to_string().as_bytes());
    let digest = hasher.finalize();
    format!("<mask.hash: '{}'>", STANDARD_NO_PAD.encode(&digest[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgumentError;
    use crate::message::privacy::{Mask, Privacy};
    use std::borrow::Cow;
    use std::cell::Cell;

    #[test]
    fn test_private_is_redacted_by_default() {
        let n = 4;
        let message = InterpolatedMessage::builder()
            .literal("hey girl!! ")
            .arg_with(&n, Privacy::PRIVATE)
            .build();

        let text = render(&message, &DisclosurePolicy::default());
        assert_eq!(text, "hey girl!! {private}");
        assert!(!text.contains('4'));
        assert_eq!(render(&message, &DisclosurePolicy::disclose_all()), "hey girl!! 4");
    }

    #[test]
    fn test_hidden_argument_is_not_evaluated() {
        let calls = Cell::new(0);
        let message = InterpolatedMessage::builder()
            .arg_lazy(Privacy::PRIVATE, || {
                calls.set(calls.get() + 1);
                ArgValue::Int(1)
            })
            .build();

        render(&message, &DisclosurePolicy::default());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_hash_mask_is_stable_and_distinguishing() {
        let masked = Privacy::private_masked(Mask::Hash);
        let (a, b) = ("alice@example.com", "bob@example.com");
        let policy = DisclosurePolicy::default();

        let render_one = |v: &str| {
            let message = InterpolatedMessage::builder().arg_with(v, masked).build();
            render(&message, &policy)
        };

        assert_eq!(render_one(a), render_one(a));
        assert_ne!(render_one(a), render_one(b));
        assert!(render_one(a).starts_with("<mask.hash: '"));
        assert!(!render_one(a).contains("alice"));
    }

    #[test]
    fn test_mask_depends_on_salt_and_kind() {
        let value = ArgValue::Int(4);
        assert_ne!(mask_digest(&value, ""), mask_digest(&value, "pepper"));
        assert_ne!(mask_digest(&value, ""), mask_digest(&ArgValue::Str("4".into()), ""));
    }

    #[test]
    fn test_masked_value_shown_when_disclosed() {
        let message = InterpolatedMessage::builder()
            .arg_with("visible", Privacy::private_masked(Mask::Hash))
            .build();
        assert_eq!(render(&message, &DisclosurePolicy::disclose_all()), "visible");
    }

    #[test]
    fn test_failing_argument_does_not_abort() {
        let message = InterpolatedMessage::builder()
            .literal("a=")
            .arg_try(Privacy::PUBLIC, || Err(ArgumentError::Unavailable("gone".into())))
            .literal(" b=")
            .arg_lazy(Privacy::PUBLIC, || panic!("producer bug"))
            .literal(" c=")
            .arg(&3)
            .build();

        assert_eq!(
            render(&message, &DisclosurePolicy::default()),
            "a={unrenderable} b={unrenderable} c=3"
        );
    }

    #[test]
    fn test_surplus_arguments_are_space_separated() {
        let (x, y, z) = (1, 2, 3);
        let message = InterpolatedMessage::build(
            vec![Cow::Borrowed("n=")],
            vec![
                Argument::value(&x, Privacy::PUBLIC),
                Argument::value(&y, Privacy::PUBLIC),
                Argument::value(&z, Privacy::PRIVATE),
            ],
        );
        assert_eq!(render(&message, &DisclosurePolicy::default()), "n=1 2 {private}");
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let word = String::from("same");
        let message = InterpolatedMessage::builder().literal("w=").arg(&word).build();
        let policy = DisclosurePolicy::default();
        assert_eq!(render(&message, &policy), render(&message, &policy));
    }
}
