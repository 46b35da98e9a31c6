//! Message routing helpers
//!
//! Recognizes the fixed command words, addresses, the `nearby:` command, order
//! references and numeric selections. Everything is matched on word
//! boundaries so "hi" never fires inside "chicken".

use order_engine_core::text::{contains_any, squash_whitespace, words};
use order_engine_core::CatalogIndex;
use regex::Regex;

use crate::Result;

/// Prefixes that mark the rest of a message as an address
pub const ADDRESS_PREFIXES: &[&str] = &["location:", "address:"];

/// Words that make a message read as an address
pub const ADDRESS_KEYWORDS: &[&str] = &[
    "house no", "sector", "colony", "street", "road", "block", "area", "plot no",
];

const NEARBY_PREFIX: &str = "nearby:";

/// Whole-message commands. None of them is ever taken as an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    Cancel,
    Confirm,
    Order,
    Help,
    /// hi, hello, start, back, main
    Start,
    Track,
}

impl Command {
    /// Exact match on the whole message, ignoring case and trailing punctuation
    pub fn parse(text: &str) -> Option<Self> {
        let word = text
            .trim()
            .trim_end_matches(|c: char| c == '!' || c == '.' || c == '?')
            .to_lowercase();
        match word.as_str() {
            "menu" => Some(Command::Menu),
            "cancel" => Some(Command::Cancel),
            "confirm" => Some(Command::Confirm),
            "order" => Some(Command::Order),
            "help" => Some(Command::Help),
            "hi" | "hello" | "start" | "back" | "main" => Some(Command::Start),
            "track" => Some(Command::Track),
            _ => None,
        }
    }
}

/// What an address message boiled down to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
    Address {
        address: String,
        instructions: Option<String>,
    },
    /// Only "near me" or a bare prefix; the customer has to type something
    NeedsAddress,
}

/// A parsed `nearby: <place> [within N km]` command
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub place: String,
    pub radius_km: Option<f64>,
}

pub struct MessageRouter {
    instructions: Regex,
    proximity: Regex,
    radius: Regex,
    order_reference: Regex,
}

impl MessageRouter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            instructions: Regex::new(r"(?i)\|\s*instructions?\s*:")?,
            proximity: Regex::new(r"(?i)\b(?:near|around)\s+me\b")?,
            radius: Regex::new(r"(?i)\s*\bwithin\s+(\d+(?:\.\d+)?)\s*km\b\s*$")?,
            order_reference: Regex::new(
                r"(?i)(?:\btrack(?:\s+my)?(?:\s+order)?\s*#?|\border\s*#|#)\s*(\d+)\b",
            )?,
        })
    }

    /// Explicit prefix or an address keyword
    pub fn is_address(&self, text: &str) -> bool {
        let lower = text.trim().to_lowercase();
        ADDRESS_PREFIXES.iter().any(|p| lower.starts_with(p)) || contains_any(&lower, ADDRESS_KEYWORDS)
    }

    /// Split an address message into the address and optional instructions.
    ///
    /// Drops a `location:`/`address:` prefix and "near me"/"around me".
    pub fn parse_address(&self, text: &str) -> AddressInput {
        let text = text.trim();
        let (address, instructions) = match self.instructions.find(text) {
            Some(m) => {
                let instructions = text[m.end()..].trim();
                (
                    &text[..m.start()],
                    (!instructions.is_empty()).then(|| instructions.to_string()),
                )
            },
            None => (text, None),
        };

        let address = strip_prefix_ignore_case(address.trim(), ADDRESS_PREFIXES);
        let address = self.proximity.replace_all(address, " ");
        let address = squash_whitespace(&address);
        let address = address.trim_matches(|c: char| c == ',' || c.is_whitespace());

        if address.is_empty() {
            AddressInput::NeedsAddress
        } else {
            AddressInput::Address {
                address: address.to_string(),
                instructions,
            }
        }
    }

    /// `nearby: <place> [within N km]`; `None` when the prefix is absent
    pub fn parse_nearby(&self, text: &str) -> Option<NearbyQuery> {
        let text = text.trim();
        if !text.to_lowercase().starts_with(NEARBY_PREFIX) {
            return None;
        }
        let rest = text.get(NEARBY_PREFIX.len()..).unwrap_or_default();

        let (place, radius_km) = match self.radius.captures(rest) {
            Some(caps) => {
                let radius = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .filter(|r| *r > 0.0);
                let start = caps.get(0).map(|m| m.start()).unwrap_or(rest.len());
                (&rest[..start], radius)
            },
            None => (rest, None),
        };

        Some(NearbyQuery {
            place: squash_whitespace(place)
                .trim_matches(|c: char| c == ',' || c.is_whitespace())
                .to_string(),
            radius_km,
        })
    }

    /// Order id from "track order 12", "order #12" or "#12"
    pub fn order_reference(&self, text: &str) -> Option<u64> {
        self.order_reference
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Starts with "track", or names an order id
    pub fn is_track_request(&self, text: &str) -> bool {
        words(text).first().map(String::as_str) == Some("track") || self.order_reference(text).is_some()
    }

    /// A digits-only reply. Numbers too large to index read as `usize::MAX`.
    pub fn selection(&self, text: &str) -> Option<usize> {
        let text = text.trim();
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(text.parse().unwrap_or(usize::MAX))
    }

    /// Digits or any catalog alias present
    pub fn has_order_signal(&self, text: &str, catalog: &CatalogIndex) -> bool {
        let lower = text.to_lowercase();
        lower.chars().any(|c| c.is_ascii_digit())
            || catalog
                .alias_entries()
                .iter()
                .any(|entry| order_engine_core::text::contains_phrase(&lower, &entry.alias))
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefixes: &[&str]) -> &'a str {
    for prefix in prefixes {
        let head = text.get(..prefix.len());
        if head.is_some_and(|h| h.eq_ignore_ascii_case(prefix)) {
            return text.get(prefix.len()..).unwrap_or_default();
        }
    }
    text
}
