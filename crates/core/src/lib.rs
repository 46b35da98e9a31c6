//! Core types and traits for the conversational order engine
//!
//! This crate provides the types every other crate speaks:
//! - Catalog items and the immutable alias index
//! - Branches, third-party listings and ranked nearby options
//! - Order lines and the draft order entity
//! - Conversation states, sessions and the location scratch slot
//! - Intents, outbound messages and turn outcomes
//! - Traits for pluggable classifiers and geocoders

pub mod branch;
pub mod catalog;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod message;
pub mod order;
pub mod text;
pub mod traits;

pub use branch::{Branch, GeoPoint, ListingPosition, NearbyOption, OutletKind, ThirdPartyListing};
pub use catalog::{expand_aliases, AliasEntry, AliasSource, CatalogIndex, CatalogItem};
pub use conversation::{
    ConversationEntry, ConversationSession, ConversationState, MessageDirection, PendingLocation,
};
pub use error::{Error, Result};
pub use intent::{Classification, ClassifierSource, Intent};
pub use message::{ListOption, OutboundMessage, TurnNotice, TurnOutcome};
pub use order::{AssignedOutlet, DraftOrder, ExtractedLine, OrderStatus, ResolvedLine};
pub use traits::{Classifier, GeocodedPlace, Geocoder};
