//! Integration tests for the conversation flow (message -> draft -> location -> confirmation)
//!
//! A scripted geocoder stands in for Nominatim so every address resolves
//! deterministically.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use order_engine_agent::{EngineConfig, OrderEngine};
use order_engine_config::{BranchesConfig, CatalogConfig};
use order_engine_core::{
    AssignedOutlet, Branch, ConversationSession, ConversationState, DraftOrder, GeoPoint,
    GeocodedPlace, Geocoder, MessageDirection, OrderStatus, OutboundMessage, TurnNotice,
};
use order_engine_location::{BranchDirectory, CityFallback, LocationResolver};
use order_engine_persistence::{
    InMemoryOrderStore, InMemorySessionStore, OrderStore, PersistenceError, PersistenceLayer,
    SessionStore,
};
use order_engine_text_processing::IntentClassifier;

const CUSTOMER: &str = "923001112233";

/// Knows two Karachi neighbourhoods, nothing else
struct TestGeocoder;

#[async_trait]
impl Geocoder for TestGeocoder {
    async fn geocode(&self, query: &str) -> order_engine_core::Result<Option<GeocodedPlace>> {
        let query = query.to_lowercase();
        let place = if query.contains("gulshan") {
            Some(GeocodedPlace {
                location: GeoPoint::new(24.9215, 67.0934),
                label: "Gulshan-e-Iqbal, Karachi".to_string(),
            })
        } else if query.contains("tariq road") {
            Some(GeocodedPlace {
                location: GeoPoint::new(24.8607, 67.0011),
                label: "Tariq Road, Karachi".to_string(),
            })
        } else {
            None
        };
        Ok(place)
    }

    fn name(&self) -> &str {
        "test"
    }
}

/// Every call fails
struct BrokenSessions;

#[async_trait]
impl SessionStore for BrokenSessions {
    async fn get(&self, _customer_id: &str) -> Result<Option<ConversationSession>, PersistenceError> {
        Err(PersistenceError::Io("connection refused".to_string()))
    }

    async fn put(&self, _session: &ConversationSession) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io("connection refused".to_string()))
    }

    async fn delete(&self, _customer_id: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io("connection refused".to_string()))
    }

    fn is_distributed(&self) -> bool {
        true
    }
}

/// Reads always work; writes fail while `failing` is set
#[derive(Default)]
struct FlakySessions {
    inner: InMemorySessionStore,
    failing: AtomicBool,
}

impl FlakySessions {
    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for FlakySessions {
    async fn get(&self, customer_id: &str) -> Result<Option<ConversationSession>, PersistenceError> {
        self.inner.get(customer_id).await
    }

    async fn put(&self, session: &ConversationSession) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io("disk full".to_string()));
        }
        self.inner.put(session).await
    }

    async fn delete(&self, customer_id: &str) -> Result<(), PersistenceError> {
        self.inner.delete(customer_id).await
    }

    fn is_distributed(&self) -> bool {
        false
    }
}

/// Hands out ids but cannot save
#[derive(Default)]
struct ReadOnlyOrders {
    inner: InMemoryOrderStore,
}

#[async_trait]
impl OrderStore for ReadOnlyOrders {
    async fn next_order_id(&self) -> Result<u64, PersistenceError> {
        self.inner.next_order_id().await
    }

    async fn save(&self, _order: &DraftOrder) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io("read-only file system".to_string()))
    }

    async fn get(&self, order_id: u64) -> Result<Option<DraftOrder>, PersistenceError> {
        self.inner.get(order_id).await
    }

    async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<DraftOrder>, PersistenceError> {
        self.inner.list_for_customer(customer_id, limit).await
    }
}

/// Built-in directory plus a Clifton branch, so Tariq Road sees five outlets
fn resolver() -> LocationResolver {
    let mut branches = BranchesConfig::builtin().unwrap();
    branches.branches.push(Branch {
        id: 6,
        name: "Coffee Wagera Clifton".to_string(),
        address: "Clifton Block 5, Karachi, Pakistan".to_string(),
        location: GeoPoint::new(24.8138, 67.0300),
        phone: "+923001234572".to_string(),
        active: true,
    });

    LocationResolver::new(
        Some(Arc::new(TestGeocoder)),
        CityFallback::from_config(&branches),
        BranchDirectory::from_config(&branches),
        Duration::from_millis(200),
        2,
    )
}

fn engine_with(config: EngineConfig, store: PersistenceLayer) -> OrderEngine {
    let catalog = CatalogConfig::builtin().unwrap().into_index().unwrap();
    OrderEngine::new(
        config,
        catalog,
        IntentClassifier::rules_only(),
        resolver(),
        store,
    )
    .unwrap()
}

fn engine() -> OrderEngine {
    engine_with(EngineConfig::default(), PersistenceLayer::in_memory())
}

fn listed_options(messages: &[OutboundMessage]) -> usize {
    messages
        .iter()
        .find_map(|m| match m {
            OutboundMessage::List { options, .. } => Some(options.len()),
            OutboundMessage::Text { .. } => None,
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn test_order_to_confirmation() {
    let engine = engine();

    let outcome = engine.handle_message(CUSTOMER, "2 cappuccino 1 cookie").await;
    assert_eq!(outcome.previous_state, ConversationState::New);
    assert_eq!(outcome.state, ConversationState::AwaitingLocation);
    let draft = engine.get_pending_order(CUSTOMER).await.unwrap().unwrap();
    assert_eq!(draft.total_amount(), 850.0);
    assert_eq!(draft.lines.len(), 2);

    let outcome = engine
        .handle_message(CUSTOMER, "location: Tariq Road, Karachi | instructions: ring the bell")
        .await;
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    assert_eq!(listed_options(&outcome.messages), 5);
    assert!(outcome.notices.is_empty());

    let outcome = engine.handle_message(CUSTOMER, "7").await;
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    assert!(outcome.has_notice(&TurnNotice::SelectionOutOfRange { max: 5 }));
    assert!(outcome.rendered().contains("between 1-5"));

    let outcome = engine.handle_message(CUSTOMER, "1").await;
    assert_eq!(outcome.state, ConversationState::AwaitingConfirmation);
    let rendered = outcome.rendered();
    assert!(rendered.contains("ORDER SUMMARY"));
    assert!(rendered.contains("Instructions: ring the bell"));
    let draft = engine.get_pending_order(CUSTOMER).await.unwrap().unwrap();
    assert!(matches!(
        draft.outlet,
        Some(AssignedOutlet::Branch { branch_id: 1, .. })
    ));
    assert_eq!(draft.address.as_deref(), Some("Tariq Road, Karachi"));

    let outcome = engine.handle_message(CUSTOMER, "confirm").await;
    assert_eq!(outcome.state, ConversationState::Confirmed);
    assert!(outcome.rendered().contains("Order #1 confirmed! Total: Rs. 850"));
    assert_eq!(
        engine.get_user_state(CUSTOMER).await.unwrap(),
        ConversationState::New
    );
    assert!(engine.get_pending_order(CUSTOMER).await.unwrap().is_none());

    let history = engine.order_history(CUSTOMER, 10).await.unwrap();
    assert_eq!(history[0].status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn test_zinger_burger_opens_draft() {
    let engine = engine();

    let outcome = engine.handle_message(CUSTOMER, "1 zinger burger").await;
    assert_eq!(outcome.state, ConversationState::AwaitingLocation);
    assert!(outcome.rendered().contains("Location Share Karein"));
    let draft = engine.get_pending_order(CUSTOMER).await.unwrap().unwrap();
    assert_eq!(draft.total_amount(), 550.0);

    let outcome = engine
        .handle_message(CUSTOMER, "location: Gulshan, Karachi")
        .await;
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    assert_eq!(listed_options(&outcome.messages), 3);
}

#[tokio::test]
async fn test_third_party_choice_drops_draft() {
    let engine = engine();
    engine.handle_message(CUSTOMER, "1 zinger burger").await;
    engine
        .handle_message(CUSTOMER, "location: Gulshan, Karachi")
        .await;

    // every Gulshan option is a third-party listing
    let outcome = engine.handle_message(CUSTOMER, "2").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert!(outcome.rendered().contains("You selected"));
    assert!(engine.get_pending_order(CUSTOMER).await.unwrap().is_none());

    let history = engine.order_history(CUSTOMER, 10).await.unwrap();
    assert_eq!(history[0].status, OrderStatus::Cancelled);
    assert!(matches!(
        history[0].outlet,
        Some(AssignedOutlet::ThirdParty { .. })
    ));
}

#[tokio::test]
async fn test_empty_message_shows_menu() {
    let engine = engine();

    let outcome = engine.handle_message(CUSTOMER, "   ").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert!(outcome.has_notice(&TurnNotice::RecoverableExtractionFailure));
    assert!(outcome.rendered().contains("HAMARA MENU"));
    assert!(engine.get_pending_order(CUSTOMER).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_items_create_nothing() {
    let engine = engine();

    let outcome = engine.handle_message(CUSTOMER, "3 qwerty").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert!(outcome.has_notice(&TurnNotice::RecoverableExtractionFailure));
    assert!(engine.order_history(CUSTOMER, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confirm_and_cancel_are_idempotent() {
    let engine = engine();

    engine.handle_message(CUSTOMER, "1 zinger burger").await;
    let outcome = engine.handle_message(CUSTOMER, "cancel").await;
    assert_eq!(outcome.state, ConversationState::Cancelled);
    assert!(outcome.rendered().contains("Order cancelled"));

    let again = engine.handle_message(CUSTOMER, "cancel").await;
    assert_eq!(again.state, ConversationState::New);
    assert!(again.has_notice(&TurnNotice::NoPendingOrder));

    let confirm = engine.handle_message(CUSTOMER, "confirm").await;
    assert_eq!(confirm.state, ConversationState::New);
    assert!(confirm.has_notice(&TurnNotice::NoPendingOrder));

    let history = engine.order_history(CUSTOMER, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_expired_options_ask_for_location_again() {
    let config = EngineConfig {
        location_ttl: Duration::ZERO,
        ..EngineConfig::default()
    };
    let engine = engine_with(config, PersistenceLayer::in_memory());

    engine.handle_message(CUSTOMER, "1 zinger burger").await;
    engine
        .handle_message(CUSTOMER, "location: Tariq Road, Karachi")
        .await;

    let outcome = engine.handle_message(CUSTOMER, "1").await;
    assert!(outcome.has_notice(&TurnNotice::ScratchExpired));
    assert_eq!(outcome.state, ConversationState::AwaitingLocation);
    assert!(engine.get_pending_order(CUSTOMER).await.unwrap().is_some());
}

#[tokio::test]
async fn test_fallback_location_is_flagged() {
    let engine = engine();
    engine.handle_message(CUSTOMER, "2 cappuccino 1 samosa").await;

    let outcome = engine
        .handle_message(CUSTOMER, "house no 5, sector g-9, Islamabad")
        .await;
    assert!(outcome.has_notice(&TurnNotice::LocationFallback {
        label: "Islamabad, Pakistan".to_string(),
    }));
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    assert_eq!(listed_options(&outcome.messages), 4);
}

#[tokio::test]
async fn test_address_before_order() {
    let engine = engine();

    let outcome = engine
        .handle_message(CUSTOMER, "location: Gulshan, Karachi")
        .await;
    assert_eq!(outcome.state, ConversationState::New);
    assert!(outcome.rendered().contains("place an order first"));
}

#[tokio::test]
async fn test_nearby_command_without_draft() {
    let engine = engine();

    let outcome = engine
        .handle_message(CUSTOMER, "nearby: Tariq Road, Karachi within 3 km")
        .await;
    assert_eq!(outcome.state, ConversationState::New);
    assert_eq!(listed_options(&outcome.messages), 4);
    assert!(outcome.rendered().contains("RESTAURANTS NEAR TARIQ ROAD, KARACHI"));
}

#[tokio::test]
async fn test_nearby_command_acts_as_location_step() {
    let engine = engine();
    engine.handle_message(CUSTOMER, "1 zinger burger").await;

    let outcome = engine
        .handle_message(CUSTOMER, "nearby: Gulshan, Karachi")
        .await;
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    assert_eq!(listed_options(&outcome.messages), 3);
}

#[tokio::test]
async fn test_track_order() {
    let engine = engine();
    engine.handle_message(CUSTOMER, "1 zinger burger").await;
    engine
        .handle_message(CUSTOMER, "location: Tariq Road, Karachi")
        .await;
    engine.handle_message(CUSTOMER, "1").await;
    engine.handle_message(CUSTOMER, "confirm").await;

    let outcome = engine.handle_message(CUSTOMER, "track order 1").await;
    let rendered = outcome.rendered();
    assert!(rendered.contains("Order #1 Status"));
    assert!(rendered.contains("Coffee Wagera Karachi"));

    let stranger = engine.handle_message("923009998877", "track order 1").await;
    assert!(stranger.rendered().contains("not found"));

    let prompt = engine.handle_message(CUSTOMER, "track").await;
    assert!(prompt.rendered().contains("provide your order ID"));
}

#[tokio::test]
async fn test_order_text_mid_flow_reprompts() {
    let engine = engine();
    engine.handle_message(CUSTOMER, "1 zinger burger").await;
    engine
        .handle_message(CUSTOMER, "location: Tariq Road, Karachi")
        .await;
    engine.handle_message(CUSTOMER, "1").await;

    let outcome = engine.handle_message(CUSTOMER, "2 latte").await;
    assert_eq!(outcome.state, ConversationState::AwaitingConfirmation);
    assert!(outcome.rendered().contains("Type 'confirm'"));
    assert_eq!(engine.order_history(CUSTOMER, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_storage_failure_is_reported() {
    let store = PersistenceLayer {
        sessions: Arc::new(BrokenSessions),
        ..PersistenceLayer::in_memory()
    };
    let engine = engine_with(EngineConfig::default(), store);

    let outcome = engine.handle_message(CUSTOMER, "1 zinger burger").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert_eq!(outcome.notices, vec![TurnNotice::StorageUnavailable]);
    assert!(engine.get_user_state(CUSTOMER).await.is_err());
}

#[tokio::test]
async fn test_conversation_is_logged() {
    let engine = engine();
    engine.handle_message(CUSTOMER, "hi").await;
    engine.handle_message(CUSTOMER, "menu").await;

    let history = engine.conversation_history(CUSTOMER, None).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].direction, MessageDirection::User);
    assert_eq!(history[0].text, "hi");
    assert_eq!(history[1].direction, MessageDirection::Bot);
    assert!(history[1].text.contains("Swagat"));

    let tail = engine
        .conversation_history(CUSTOMER, Some(1))
        .await
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert!(tail[0].text.contains("HAMARA MENU"));
}

#[tokio::test]
async fn test_customers_are_independent() {
    let engine = Arc::new(engine());

    let a = tokio::spawn({
        let engine = engine.clone();
        async move { engine.handle_message("customer-a", "1 zinger burger").await }
    });
    let b = tokio::spawn({
        let engine = engine.clone();
        async move { engine.handle_message("customer-b", "menu").await }
    });
    assert_eq!(a.await.unwrap().state, ConversationState::AwaitingLocation);
    assert_eq!(b.await.unwrap().state, ConversationState::New);

    let pending = engine.get_pending_order("customer-a").await.unwrap().unwrap();
    assert_eq!(pending.customer_id, "customer-a");
    assert!(engine.get_pending_order("customer-b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_session_write_creates_no_draft() {
    let sessions = Arc::new(FlakySessions::default());
    sessions.set_failing(true);
    let store = PersistenceLayer {
        sessions: sessions.clone(),
        ..PersistenceLayer::in_memory()
    };
    let engine = engine_with(EngineConfig::default(), store);

    let outcome = engine.handle_message(CUSTOMER, "1 zinger burger").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert_eq!(outcome.notices, vec![TurnNotice::StorageUnavailable]);
    assert!(engine.order_history(CUSTOMER, 10).await.unwrap().is_empty());
    assert!(engine.get_pending_order(CUSTOMER).await.unwrap().is_none());
    assert_eq!(
        engine.get_user_state(CUSTOMER).await.unwrap(),
        ConversationState::New
    );
}

#[tokio::test]
async fn test_failed_session_write_keeps_draft_and_options() {
    let sessions = Arc::new(FlakySessions::default());
    let store = PersistenceLayer {
        sessions: sessions.clone(),
        ..PersistenceLayer::in_memory()
    };
    let engine = engine_with(EngineConfig::default(), store);

    engine.handle_message(CUSTOMER, "1 zinger burger").await;
    engine
        .handle_message(CUSTOMER, "location: Gulshan, Karachi")
        .await;

    sessions.set_failing(true);
    let outcome = engine.handle_message(CUSTOMER, "2").await;
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    assert_eq!(outcome.notices, vec![TurnNotice::StorageUnavailable]);
    let draft = engine.get_pending_order(CUSTOMER).await.unwrap().unwrap();
    assert_eq!(draft.status, OrderStatus::Draft);
    assert!(draft.outlet.is_none());

    // the listed options survived, so the same choice works once storage is back
    sessions.set_failing(false);
    let outcome = engine.handle_message(CUSTOMER, "2").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert!(outcome.rendered().contains("You selected"));
    let history = engine.order_history(CUSTOMER, 10).await.unwrap();
    assert_eq!(history[0].status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_failed_order_write_restores_session() {
    let store = PersistenceLayer {
        orders: Arc::new(ReadOnlyOrders::default()),
        ..PersistenceLayer::in_memory()
    };
    let engine = engine_with(EngineConfig::default(), store);

    let outcome = engine.handle_message(CUSTOMER, "1 zinger burger").await;
    assert_eq!(outcome.state, ConversationState::New);
    assert_eq!(outcome.notices, vec![TurnNotice::StorageUnavailable]);
    assert_eq!(
        engine.get_user_state(CUSTOMER).await.unwrap(),
        ConversationState::New
    );

    // a retry starts cleanly rather than chasing the unsaved draft
    let outcome = engine.handle_message(CUSTOMER, "location: Gulshan, Karachi").await;
    assert_eq!(outcome.previous_state, ConversationState::New);
    assert!(outcome.rendered().contains("place an order first"));
}

#[tokio::test]
async fn test_session_cannot_adopt_another_customers_order() {
    let store = PersistenceLayer::in_memory();
    let engine = engine_with(EngineConfig::default(), store.clone());

    engine.handle_message("bob", "1 zinger burger").await;
    let bobs = engine.get_pending_order("bob").await.unwrap().unwrap();

    // a session left pointing at an id that now belongs to bob
    let mut stale = ConversationSession::new("alice");
    stale.transition(ConversationState::AwaitingLocation).unwrap();
    stale.active_order_id = Some(bobs.id);
    store.sessions.put(&stale).await.unwrap();
    assert!(engine.get_pending_order("alice").await.unwrap().is_none());

    let outcome = engine
        .handle_message("alice", "location: Gulshan, Karachi")
        .await;
    assert_eq!(outcome.previous_state, ConversationState::AwaitingLocation);
    assert_eq!(outcome.state, ConversationState::New);
    assert!(engine.get_pending_order("alice").await.unwrap().is_none());

    let after = engine.get_pending_order("bob").await.unwrap().unwrap();
    assert_eq!(after, bobs);
    assert!(after.location.is_none());
    assert_eq!(
        engine.get_user_state("bob").await.unwrap(),
        ConversationState::AwaitingLocation
    );
}

#[tokio::test]
async fn test_restart_keeps_drafts_and_order_ids() {
    let dir = tempfile::tempdir().unwrap();

    let before = engine_with(
        EngineConfig::default(),
        PersistenceLayer::with_data_dir(dir.path()).await.unwrap(),
    );
    before.handle_message(CUSTOMER, "1 zinger burger").await;
    let first = before.get_pending_order(CUSTOMER).await.unwrap().unwrap();
    drop(before);

    let after = engine_with(
        EngineConfig::default(),
        PersistenceLayer::with_data_dir(dir.path()).await.unwrap(),
    );
    after.handle_message("923009998877", "2 cappuccino").await;
    let second = after.get_pending_order("923009998877").await.unwrap().unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.customer_id, "923009998877");

    let outcome = after
        .handle_message(CUSTOMER, "location: Gulshan, Karachi")
        .await;
    assert_eq!(outcome.previous_state, ConversationState::AwaitingLocation);
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);
    let draft = after.get_pending_order(CUSTOMER).await.unwrap().unwrap();
    assert_eq!(draft.id, first.id);
    assert_eq!(draft.customer_id, CUSTOMER);
}

#[tokio::test]
async fn test_workers_share_file_stores() {
    let dir = tempfile::tempdir().unwrap();
    let worker_a = engine_with(
        EngineConfig::default(),
        PersistenceLayer::with_data_dir(dir.path()).await.unwrap(),
    );
    let worker_b = engine_with(
        EngineConfig::default(),
        PersistenceLayer::with_data_dir(dir.path()).await.unwrap(),
    );

    worker_a.handle_message(CUSTOMER, "1 zinger burger").await;
    let outcome = worker_b
        .handle_message(CUSTOMER, "location: Tariq Road, Karachi")
        .await;
    assert_eq!(outcome.previous_state, ConversationState::AwaitingLocation);
    assert_eq!(outcome.state, ConversationState::AwaitingRestaurantChoice);

    // options listed by B are picked up by A
    let outcome = worker_a.handle_message(CUSTOMER, "1").await;
    assert_eq!(outcome.state, ConversationState::AwaitingConfirmation);

    let outcome = worker_b.handle_message(CUSTOMER, "confirm").await;
    assert_eq!(outcome.state, ConversationState::Confirmed);
    let history = worker_a.order_history(CUSTOMER, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OrderStatus::Confirmed);
    assert!(matches!(
        history[0].outlet,
        Some(AssignedOutlet::Branch { branch_id: 1, .. })
    ));
}
