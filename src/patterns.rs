//! Compiled class-name patterns for the microformats grammar.
//!
//! All patterns are compiled once at startup using `LazyLock` and shared
//! across parses.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Matches microformats2 root class names (`h-card`, `h-entry`,
/// `h-x-custom`, ...). A vendor segment like `x1-` is allowed before the
/// first word.
pub static ROOT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^h-(?:[a-z0-9]+-)?[a-z]+(?:-[a-z]+)*$").expect("ROOT_CLASS regex")
});

/// Matches microformats2 property class names (`p-name`, `u-url`,
/// `dt-published`, `e-content`, ...).
pub static PROPERTY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:p|u|dt|e)-(?:[a-z0-9]+-)?[a-z]+(?:-[a-z]+)*$").expect("PROPERTY_CLASS regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_class_matches() {
        for class in ["h-card", "h-entry", "h-review-aggregate", "h-x-custom", "h-geo"] {
            assert!(ROOT_CLASS.is_match(class), "{class} should match");
        }
    }

    #[test]
    fn root_class_rejects() {
        for class in ["hcard", "vcard", "p-name", "h-", "h-Card", "h-card ", "H-CARD"] {
            assert!(!ROOT_CLASS.is_match(class), "{class} should not match");
        }
    }

    #[test]
    fn property_class_matches() {
        for class in ["p-name", "u-url", "dt-updated", "e-content", "p-job-title", "u-like-of"] {
            assert!(PROPERTY_CLASS.is_match(class), "{class} should match");
        }
    }

    #[test]
    fn property_class_rejects() {
        for class in ["pname", "h-card", "x-whatever", "p-", "dt-Updated", "value"] {
            assert!(!PROPERTY_CLASS.is_match(class), "{class} should not match");
        }
    }
}
