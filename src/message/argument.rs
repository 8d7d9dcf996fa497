//! Lazily evaluated message arguments.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::ArgumentError;
use crate::message::privacy::Privacy;

/// A concrete argument value, produced at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl ArgValue {
    /// Short tag distinguishing value kinds, mixed into hash masks.
    pub fn kind_tag(&self) -> u8 {
        match self {
            ArgValue::Int(_) => b'i',
            ArgValue::UInt(_) => b'u',
            ArgValue::Float(_) => b'f',
            ArgValue::Bool(_) => b'b',
            ArgValue::Str(_) => b's',
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, ArgValue::Str(_))
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::UInt(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Str(v) => f.write_str(v),
        }
    }
}

/// Types that can be interpolated into a message.
pub trait LogValue {
    fn to_arg_value(&self) -> ArgValue;
}

impl<T: LogValue + ?Sized> LogValue for &T {
    fn to_arg_value(&self) -> ArgValue {
        (**self).to_arg_value()
    }
}

macro_rules! signed_log_value {
    ($($t:ty),*) => {
        $(impl LogValue for $t {
            fn to_arg_value(&self) -> ArgValue {
                ArgValue::Int(*self as i64)
            }
        })*
    };
}

macro_rules! unsigned_log_value {
    ($($t:ty),*) => {
        $(impl LogValue for $t {
            fn to_arg_value(&self) -> ArgValue {
                ArgValue::UInt(*self as u64)
            }
        })*
    };
}

signed_log_value!(i8, i16, i32, i64, isize);
unsigned_log_value!(u8, u16, u32, u64, usize);

impl LogValue for f32 {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Float(f64::from(*self))
    }
}

impl LogValue for f64 {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Float(*self)
    }
}

impl LogValue for bool {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Bool(*self)
    }
}

impl LogValue for char {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.to_string())
    }
}

impl LogValue for str {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.to_owned())
    }
}

impl LogValue for String {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.clone())
    }
}

impl LogValue for ArgValue {
    fn to_arg_value(&self) -> ArgValue {
        self.clone()
    }
}

impl<T: LogValue> LogValue for Option<T> {
    fn to_arg_value(&self) -> ArgValue {
        match self {
            Some(v) => v.to_arg_value(),
            None => ArgValue::Str("(null)".to_string()),
        }
    }
}

/// Interpolates any `Display` type through its textual form.
pub struct Displayed<T>(pub T);

impl<T: fmt::Display> LogValue for Displayed<T> {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.0.to_string())
    }
}

type Producer<'a> = Box<dyn Fn() -> Result<ArgValue, ArgumentError> + 'a>;

/// One interpolated argument: a deferred value producer plus its privacy tag.
///
/// The producer runs only when a driver renders or encodes the message.
pub struct Argument<'a> {
    producer: Producer<'a>,
    privacy: Privacy,
}

impl<'a> Argument<'a> {
    /// Wrap a fallible producer.
    pub fn new<F>(privacy: Privacy, producer: F) -> Self
    where
        F: Fn() -> Result<ArgValue, ArgumentError> + 'a,
    {
        Self {
            producer: Box::new(producer),
            privacy,
        }
    }

    /// Wrap an infallible producer.
    pub fn lazy<F>(privacy: Privacy, producer: F) -> Self
    where
        F: Fn() -> ArgValue + 'a,
    {
        Self::new(privacy, move || Ok(producer()))
    }

    /// Borrow a value and convert it when evaluated.
    pub fn value<T: LogValue + ?Sized>(value: &'a T, privacy: Privacy) -> Self {
        Self::lazy(privacy, move || value.to_arg_value())
    }

    /// An argument that always fails, used where a format string has no value.
    pub(crate) fn missing(index: usize) -> Self {
        Self::new(Privacy::PUBLIC, move || Err(ArgumentError::Missing(index)))
    }

    pub fn privacy(&self) -> Privacy {
        self.privacy
    }

    /// Run the producer. Panics are contained and reported as errors.
    pub fn evaluate(&self) -> Result<ArgValue, ArgumentError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.producer)())) {
            Ok(result) => result,
            Err(_) => Err(ArgumentError::Panicked),
        }
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("privacy", &self.privacy)
            .finish_non_exhaustive()
    }
}
