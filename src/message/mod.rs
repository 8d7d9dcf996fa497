//! Interpolated message subsystem.
//!
//! # Data Flow
//! ```text
//! call site
//!     → message! / MessageBuilder (fragments + deferred arguments)
//!     → InterpolatedMessage (nothing evaluated yet)
//!     → dispatched to every driver
//!         → render.rs (policy applied, text produced per driver)
//!         → native encoder (format token + argument buffer)
//!
//! legacy "%{private}@ sent %d" strings
//!     → format.rs (parse placeholders)
//!     → InterpolatedMessage
//! ```
//!
//! # Design Decisions
//! - Arguments are closures that borrow from the call site; messages live
//!   for the duration of one synchronous dispatch
//! - Untagged arguments are public
//! - Argument failures and panics never escape rendering

pub mod argument;
pub mod format;
pub mod interpolated;
pub mod privacy;
pub mod render;

pub use argument::{ArgValue, Argument, Displayed, LogValue};
pub use interpolated::{InterpolatedMessage, MessageBuilder};
pub use privacy::{DisclosurePolicy, Mask, Privacy, PrivacyLevel};
pub use render::{REDACTED, UNRENDERABLE};

/// Build an [`InterpolatedMessage`] from literals and argument groups.
///
/// String literals become fragments, `{expr}` is a public argument and
/// `{expr; privacy}` carries an explicit classification. Arguments are
/// borrowed and converted only when rendered.
///
/// ```
/// use swog::{message, DisclosurePolicy, Privacy};
///
/// let unread = 4;
/// let msg = message!("unread: " {unread; Privacy::PRIVATE});
/// assert_eq!(msg.render(&DisclosurePolicy::default()), "unread: {private}");
/// ```
#[macro_export]
macro_rules! message {
    (@acc $b:expr;) => {
        $b.build()
    };
    (@acc $b:expr; $lit:literal $($rest:tt)*) => {
        $crate::message!(@acc $b.literal($lit); $($rest)*)
    };
    (@acc $b:expr; { $e:expr ; $p:expr } $($rest:tt)*) => {
        $crate::message!(@acc $b.arg_with(&$e, $p); $($rest)*)
    };
    (@acc $b:expr; { $e:expr } $($rest:tt)*) => {
        $crate::message!(@acc $b.arg(&$e); $($rest)*)
    };
    ($($parts:tt)+) => {
        $crate::message!(@acc $crate::InterpolatedMessage::builder(); $($parts)+)
    };
}
