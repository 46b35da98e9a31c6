//! Order lines and the draft order entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::branch::{GeoPoint, NearbyOption};

/// An item mention pulled out of free text, before catalog resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLine {
    /// Lowercase label as written (after cleaning)
    pub raw_label: String,
    pub quantity: u32,
}

impl ExtractedLine {
    pub fn new(raw_label: impl Into<String>, quantity: u32) -> Self {
        Self {
            raw_label: raw_label.into(),
            quantity,
        }
    }
}

/// A line validated against the catalog. The price is captured at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub catalog_item_id: u32,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl ResolvedLine {
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OrderStatus::Draft),
            "confirmed" => Some(OrderStatus::Confirmed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Draft)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outlet an order was routed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssignedOutlet {
    Branch {
        branch_id: u32,
        name: String,
        distance_km: f64,
    },
    /// Opaque descriptor of an outlet we do not operate
    ThirdParty { descriptor: NearbyOption },
}

impl AssignedOutlet {
    pub fn name(&self) -> &str {
        match self {
            AssignedOutlet::Branch { name, .. } => name,
            AssignedOutlet::ThirdParty { descriptor } => &descriptor.name,
        }
    }
}

/// A customer's order. The total is always derived from the lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrder {
    pub id: u64,
    pub customer_id: String,
    pub lines: Vec<ResolvedLine>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub instructions: Option<String>,
    pub outlet: Option<AssignedOutlet>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl DraftOrder {
    pub fn new(id: u64, customer_id: impl Into<String>, lines: Vec<ResolvedLine>) -> Self {
        Self {
            id,
            customer_id: customer_id.into(),
            lines,
            address: None,
            location: None,
            instructions: None,
            outlet: None,
            status: OrderStatus::Draft,
            created_at: Utc::now(),
            confirmed_at: None,
        }
    }

    /// Sum of line totals
    pub fn total_amount(&self) -> f64 {
        self.lines.iter().map(ResolvedLine::line_total).sum()
    }

    pub fn is_draft(&self) -> bool {
        self.status == OrderStatus::Draft
    }

    pub fn set_location(
        &mut self,
        address: impl Into<String>,
        location: GeoPoint,
        instructions: Option<String>,
    ) {
        self.address = Some(address.into());
        self.location = Some(location);
        if instructions.is_some() {
            self.instructions = instructions;
        }
    }

    pub fn assign_outlet(&mut self, outlet: AssignedOutlet) {
        self.outlet = Some(outlet);
    }

    /// Move a draft to confirmed. Returns false, changing nothing, for a terminal order.
    pub fn confirm(&mut self) -> bool {
        if !self.is_draft() {
            return false;
        }
        self.status = OrderStatus::Confirmed;
        self.confirmed_at = Some(Utc::now());
        true
    }

    /// Move a draft to cancelled. Returns false, changing nothing, for a terminal order.
    pub fn cancel(&mut self) -> bool {
        if !self.is_draft() {
            return false;
        }
        self.status = OrderStatus::Cancelled;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: u32, name: &str, quantity: u32, unit_price: f64) -> ResolvedLine {
        ResolvedLine {
            catalog_item_id: id,
            name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let order = DraftOrder::new(
            1,
            "923001112233",
            vec![line(2, "Cappuccino", 2, 350.0), line(9, "Cookie", 1, 150.0)],
        );
        assert_eq!(order.total_amount(), 850.0);
        assert_eq!(order.lines[0].line_total(), 700.0);
    }

    #[test]
    fn test_terminal_transitions_are_noops() {
        let mut order = DraftOrder::new(7, "c", vec![line(1, "Espresso", 1, 250.0)]);
        assert!(order.confirm());
        let confirmed_at = order.confirmed_at;
        assert!(!order.confirm());
        assert!(!order.cancel());
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.confirmed_at, confirmed_at);

        let mut other = DraftOrder::new(8, "c", vec![]);
        assert!(other.cancel());
        assert!(!other.cancel());
        assert_eq!(other.status, OrderStatus::Cancelled);
        assert!(other.confirmed_at.is_none());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [OrderStatus::Draft, OrderStatus::Confirmed, OrderStatus::Cancelled] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("shipped"), None);
    }

    #[test]
    fn test_instructions_kept_when_not_replaced() {
        let mut order = DraftOrder::new(1, "c", vec![]);
        order.set_location("a", GeoPoint::new(1.0, 2.0), Some("ring bell".into()));
        order.set_location("b", GeoPoint::new(1.0, 2.0), None);
        assert_eq!(order.address.as_deref(), Some("b"));
        assert_eq!(order.instructions.as_deref(), Some("ring bell"));
    }
}
