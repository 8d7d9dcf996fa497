//! Interpolated messages: literal fragments interleaved with arguments.

use std::borrow::Cow;

use crate::error::ArgumentError;
use crate::message::argument::{ArgValue, Argument, LogValue};
use crate::message::format::{self, FormatSegment};
use crate::message::privacy::{DisclosurePolicy, Privacy};
use crate::message::render;

/// An ordered list of literal fragments, each optionally followed by one
/// argument.
///
/// Fragment `i` is followed by argument `i`. Arguments beyond the fragment
/// count are surplus and render space-separated after the last fragment.
#[derive(Debug, Default)]
pub struct InterpolatedMessage<'a> {
    fragments: Vec<Cow<'a, str>>,
    arguments: Vec<Argument<'a>>,
}

impl<'a> InterpolatedMessage<'a> {
    /// Assemble a message from raw parts without realigning them.
    pub fn build(fragments: Vec<Cow<'a, str>>, arguments: Vec<Argument<'a>>) -> Self {
        Self {
            fragments,
            arguments,
        }
    }

    pub fn builder() -> MessageBuilder<'a> {
        MessageBuilder::default()
    }

    /// A message with a single literal and no arguments.
    pub fn literal(text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            fragments: vec![text.into()],
            arguments: Vec::new(),
        }
    }

    /// Parse a printf style format string and bind `args` to its placeholders.
    ///
    /// Placeholders without a matching value render as the failure
    /// placeholder. Extra values become surplus arguments.
    pub fn from_format(format_string: &'a str, args: &'a [ArgValue]) -> Self {
        let mut builder = MessageBuilder::default();
        let mut next = 0;
        for segment in format::parse(format_string) {
            match segment {
                FormatSegment::Literal(text) => builder = builder.literal(text),
                FormatSegment::Placeholder(spec) => {
                    let argument = match args.get(next) {
                        Some(value) => Argument::new(spec.privacy, move || Ok(spec.apply(value))),
                        None => Argument::missing(next),
                    };
                    builder = builder.push(argument);
                    next += 1;
                }
            }
        }
        let mut message = builder.build();
        let surplus = args.len().saturating_sub(next);
        if surplus > 0 && message.fragments.len() > message.arguments.len() {
            // The trailing literal would otherwise run straight into the first surplus value.
            if let Some(last) = message.fragments.last_mut() {
                last.to_mut().push(' ');
            }
        }
        for value in args.iter().skip(next) {
            message.arguments.push(Argument::value(value, Privacy::PUBLIC));
        }
        message
    }

    pub fn fragments(&self) -> &[Cow<'a, str>] {
        &self.fragments
    }

    pub fn arguments(&self) -> &[Argument<'a>] {
        &self.arguments
    }

    /// Render under `policy`. Does not consume or alter the message.
    pub fn render(&self, policy: &DisclosurePolicy) -> String {
        render::render(self, policy)
    }
}

impl<'a> From<&'a str> for InterpolatedMessage<'a> {
    fn from(text: &'a str) -> Self {
        InterpolatedMessage::literal(text)
    }
}

impl From<String> for InterpolatedMessage<'_> {
    fn from(text: String) -> Self {
        InterpolatedMessage::literal(text)
    }
}

/// Incrementally builds an aligned [`InterpolatedMessage`].
#[derive(Debug, Default)]
pub struct MessageBuilder<'a> {
    fragments: Vec<Cow<'a, str>>,
    arguments: Vec<Argument<'a>>,
}

impl<'a> MessageBuilder<'a> {
    /// Append literal text. Consecutive literals join into one fragment.
    pub fn literal(mut self, text: impl Into<Cow<'a, str>>) -> Self {
        let text = text.into();
        if self.fragments.len() > self.arguments.len() {
            if let Some(last) = self.fragments.last_mut() {
                last.to_mut().push_str(&text);
            }
        } else {
            self.fragments.push(text);
        }
        self
    }

    /// Append a public argument borrowed from the caller.
    pub fn arg<T: LogValue + ?Sized>(self, value: &'a T) -> Self {
        self.arg_with(value, Privacy::PUBLIC)
    }

    /// Append a borrowed argument with an explicit classification.
    pub fn arg_with<T: LogValue + ?Sized>(self, value: &'a T, privacy: Privacy) -> Self {
        self.push(Argument::value(value, privacy))
    }

    /// Append an argument computed by `producer` at render time.
    pub fn arg_lazy<F>(self, privacy: Privacy, producer: F) -> Self
    where
        F: Fn() -> ArgValue + 'a,
    {
        self.push(Argument::lazy(privacy, producer))
    }

    /// Append an argument whose producer may fail.
    pub fn arg_try<F>(self, privacy: Privacy, producer: F) -> Self
    where
        F: Fn() -> Result<ArgValue, ArgumentError> + 'a,
    {
        self.push(Argument::new(privacy, producer))
    }

    /// Append a prepared argument, inserting an empty fragment when two
    /// arguments would otherwise be adjacent.
    pub fn push(mut self, argument: Argument<'a>) -> Self {
        if self.fragments.len() == self.arguments.len() {
            self.fragments.push(Cow::Borrowed(""));
        }
        self.arguments.push(argument);
        self
    }

    pub fn build(self) -> InterpolatedMessage<'a> {
        InterpolatedMessage {
            fragments: self.fragments,
            arguments: self.arguments,
        }
    }
}
