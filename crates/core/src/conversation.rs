//! Conversation states, the per-customer session and the location scratch slot

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::branch::{GeoPoint, NearbyOption};
use crate::error::{Error, Result};

/// Where a customer is in the ordering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    New,
    AwaitingLocation,
    AwaitingRestaurantChoice,
    AwaitingConfirmation,
    /// Reported for the turn that confirms; the session then resets to `New`
    Confirmed,
    /// Reported for the turn that cancels; the session then resets to `New`
    Cancelled,
}

static STATE_TRANSITIONS: Lazy<HashMap<ConversationState, &'static [ConversationState]>> =
    Lazy::new(|| {
        use ConversationState::*;
        let mut map = HashMap::new();
        map.insert(New, &[AwaitingLocation] as &[_]);
        map.insert(
            AwaitingLocation,
            &[AwaitingRestaurantChoice, AwaitingConfirmation, Cancelled] as &[_],
        );
        map.insert(
            AwaitingRestaurantChoice,
            &[AwaitingConfirmation, AwaitingLocation, Cancelled, New] as &[_],
        );
        map.insert(AwaitingConfirmation, &[Confirmed, Cancelled] as &[_]);
        map.insert(Confirmed, &[New] as &[_]);
        map.insert(Cancelled, &[New] as &[_]);
        map
    });

impl ConversationState {
    pub const ALL: [ConversationState; 6] = [
        ConversationState::New,
        ConversationState::AwaitingLocation,
        ConversationState::AwaitingRestaurantChoice,
        ConversationState::AwaitingConfirmation,
        ConversationState::Confirmed,
        ConversationState::Cancelled,
    ];

    pub fn allowed_transitions(&self) -> &'static [ConversationState] {
        STATE_TRANSITIONS.get(self).copied().unwrap_or(&[])
    }

    /// Staying in the same state is always allowed
    pub fn can_transition_to(&self, target: ConversationState) -> bool {
        *self == target || self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationState::Confirmed | ConversationState::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::New => "new",
            ConversationState::AwaitingLocation => "awaiting_location",
            ConversationState::AwaitingRestaurantChoice => "awaiting_restaurant_choice",
            ConversationState::AwaitingConfirmation => "awaiting_confirmation",
            ConversationState::Confirmed => "confirmed",
            ConversationState::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == s)
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-customer conversation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub customer_id: String,
    pub state: ConversationState,
    pub active_order_id: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            state: ConversationState::New,
            active_order_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Move to `to`, rejecting edges outside the transition table
    pub fn transition(&mut self, to: ConversationState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to,
            });
        }
        if self.state != to {
            tracing::debug!(
                customer = %self.customer_id,
                from = %self.state,
                to = %to,
                "Conversation transition"
            );
        }
        self.state = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Drop the order reference and return to `New`
    pub fn reset(&mut self) {
        self.state = ConversationState::New;
        self.active_order_id = None;
        self.updated_at = Utc::now();
    }
}

/// Location captured between the address turn and the outlet selection turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLocation {
    pub location: GeoPoint,
    pub label: String,
    pub instructions: Option<String>,
    /// Exactly the options shown to the customer, in display order
    pub options: Vec<NearbyOption>,
    pub expires_at: DateTime<Utc>,
}

impl PendingLocation {
    pub fn new(
        location: GeoPoint,
        label: impl Into<String>,
        instructions: Option<String>,
        options: Vec<NearbyOption>,
        ttl: Duration,
    ) -> Self {
        Self {
            location,
            label: label.into(),
            instructions,
            options,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Direction of a logged conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    User,
    Bot,
}

/// One logged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: String,
    pub customer_id: String,
    pub direction: MessageDirection,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn new(customer_id: impl Into<String>, direction: MessageDirection, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: customer_id.into(),
            direction,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_strings() {
        for state in ConversationState::ALL {
            assert_eq!(ConversationState::from_str(state.as_str()), Some(state));
        }
        let json = serde_json::to_string(&ConversationState::AwaitingRestaurantChoice).unwrap();
        assert_eq!(json, "\"awaiting_restaurant_choice\"");
    }

    #[test]
    fn test_transition_table() {
        use ConversationState::*;
        assert!(New.can_transition_to(AwaitingLocation));
        assert!(!New.can_transition_to(Confirmed));
        assert!(AwaitingConfirmation.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(New));
        assert!(!Cancelled.can_transition_to(AwaitingLocation));
        assert!(AwaitingLocation.can_transition_to(AwaitingLocation));
    }

    #[test]
    fn test_session_rejects_bad_edge() {
        let mut session = ConversationSession::new("c1");
        assert!(session.transition(ConversationState::Confirmed).is_err());
        assert_eq!(session.state, ConversationState::New);

        session.transition(ConversationState::AwaitingLocation).unwrap();
        session.active_order_id = Some(3);
        session.reset();
        assert_eq!(session.state, ConversationState::New);
        assert!(session.active_order_id.is_none());
    }

    #[test]
    fn test_scratch_expiry() {
        let pending = PendingLocation::new(
            GeoPoint::new(24.86, 67.0),
            "Karachi",
            None,
            vec![],
            Duration::seconds(1800),
        );
        assert!(!pending.is_expired());
        assert!(pending.is_expired_at(Utc::now() + Duration::seconds(1801)));
    }
}
