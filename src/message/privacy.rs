//! Per-argument privacy classification and disclosure policy.

use serde::{Deserialize, Serialize};

/// How sensitive an argument is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivacyLevel {
    Public,
    Private,
    Auto,
}

/// Transformation applied to a hidden value instead of redacting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mask {
    #[default]
    None,
    Hash,
}

/// Classification attached to one interpolated argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Privacy {
    pub level: PrivacyLevel,
    pub mask: Mask,
}

impl Privacy {
    pub const PUBLIC: Privacy = Privacy {
        level: PrivacyLevel::Public,
        mask: Mask::None,
    };

    pub const PRIVATE: Privacy = Privacy {
        level: PrivacyLevel::Private,
        mask: Mask::None,
    };

    pub const AUTO: Privacy = Privacy {
        level: PrivacyLevel::Auto,
        mask: Mask::None,
    };

    pub const fn private_masked(mask: Mask) -> Self {
        Privacy {
            level: PrivacyLevel::Private,
            mask,
        }
    }

    pub const fn auto_masked(mask: Mask) -> Self {
        Privacy {
            level: PrivacyLevel::Auto,
            mask,
        }
    }

    pub fn has_mask(&self) -> bool {
        self.mask == Mask::Hash
    }

    /// Whether the value must be withheld when rendering under `policy`.
    pub fn is_hidden_under(&self, policy: &DisclosurePolicy) -> bool {
        match self.level {
            PrivacyLevel::Public => false,
            PrivacyLevel::Private => !policy.disclose_private,
            PrivacyLevel::Auto => !policy.disclose_auto,
        }
    }

    /// Flag bits used in native argument descriptors.
    pub fn argument_flag(&self) -> u8 {
        match self.level {
            PrivacyLevel::Private => 0x1,
            PrivacyLevel::Public => 0x2,
            PrivacyLevel::Auto => 0x0,
        }
    }

    /// The `%{...}` specifier for native format tokens, if any.
    pub fn specifier(&self) -> Option<&'static str> {
        match (self.level, self.has_mask()) {
            (PrivacyLevel::Auto, false) => None,
            (PrivacyLevel::Auto, true) => Some("mask.hash"),
            (PrivacyLevel::Public, false) => Some("public"),
            (PrivacyLevel::Public, true) => Some("public,mask.hash"),
            (PrivacyLevel::Private, false) => Some("private"),
            (PrivacyLevel::Private, true) => Some("private,mask.hash"),
        }
    }

    /// Parse the inside of a `%{...}` specifier. Unknown words are ignored.
    pub fn from_specifier(spec: &str) -> Self {
        let mut privacy = Privacy::PUBLIC;
        let mut saw_level = false;
        for word in spec.split(',').map(str::trim) {
            match word {
                "public" => {
                    privacy.level = PrivacyLevel::Public;
                    saw_level = true;
                }
                "private" => {
                    privacy.level = PrivacyLevel::Private;
                    saw_level = true;
                }
                "mask.hash" => privacy.mask = Mask::Hash,
                _ => {}
            }
        }
        if !saw_level && privacy.has_mask() {
            privacy.level = PrivacyLevel::Auto;
        }
        privacy
    }
}

impl Default for Privacy {
    fn default() -> Self {
        Privacy::PUBLIC
    }
}

/// What a renderer is allowed to reveal.
///
/// The default discloses neither private nor auto arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosurePolicy {
    /// Reveal arguments tagged `private`.
    pub disclose_private: bool,

    /// Reveal arguments tagged `auto`.
    pub disclose_auto: bool,

    /// Salt mixed into hash masks.
    pub mask_salt: String,
}

impl DisclosurePolicy {
    /// A policy that reveals everything.
    pub fn disclose_all() -> Self {
        Self {
            disclose_private: true,
            disclose_auto: true,
            mask_salt: String::new(),
        }
    }

    pub fn with_mask_salt(mut self, salt: impl Into<String>) -> Self {
        self.mask_salt = salt.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_hides_private_and_auto() {
        let policy = DisclosurePolicy::default();
        assert!(!Privacy::PUBLIC.is_hidden_under(&policy));
        assert!(Privacy::PRIVATE.is_hidden_under(&policy));
        assert!(Privacy::AUTO.is_hidden_under(&policy));
        assert!(Privacy::private_masked(Mask::Hash).is_hidden_under(&policy));
    }

    #[test]
    fn test_disclose_all() {
        let policy = DisclosurePolicy::disclose_all();
        assert!(!Privacy::PRIVATE.is_hidden_under(&policy));
        assert!(!Privacy::AUTO.is_hidden_under(&policy));
    }

    #[test]
    fn test_specifier_round_trip() {
        for privacy in [
            Privacy::PUBLIC,
            Privacy::PRIVATE,
            Privacy::private_masked(Mask::Hash),
            Privacy::auto_masked(Mask::Hash),
        ] {
            let spec = privacy.specifier().unwrap();
            assert_eq!(Privacy::from_specifier(spec), privacy);
        }
        assert_eq!(Privacy::AUTO.specifier(), None);
    }
}
