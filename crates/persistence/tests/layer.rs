//! Persistence layer wiring

use order_engine_core::{ConversationSession, ConversationState, DraftOrder, ResolvedLine};
use order_engine_persistence::PersistenceLayer;

fn zinger(id: u64, customer: &str) -> DraftOrder {
    DraftOrder::new(
        id,
        customer,
        vec![ResolvedLine {
            catalog_item_id: 20,
            name: "Zinger Burger".to_string(),
            quantity: 1,
            unit_price: 550.0,
        }],
    )
}

#[tokio::test]
async fn file_sessions_survive_a_new_layer() {
    let dir = tempfile::tempdir().unwrap();

    let first = PersistenceLayer::with_data_dir(dir.path()).await.unwrap();
    let mut session = ConversationSession::new("923001112233");
    session.transition(ConversationState::AwaitingLocation).unwrap();
    session.active_order_id = Some(1);
    first.sessions.put(&session).await.unwrap();

    let second = PersistenceLayer::with_data_dir(dir.path()).await.unwrap();
    let loaded = second.sessions.get("923001112233").await.unwrap().unwrap();
    assert_eq!(loaded.state, ConversationState::AwaitingLocation);
    assert_eq!(loaded.active_order_id, Some(1));
    assert!(second.sessions.is_distributed());
    assert!(dir.path().join("sessions").join("923001112233.json").exists());
}

#[tokio::test]
async fn file_orders_survive_a_new_layer() {
    let dir = tempfile::tempdir().unwrap();

    let first = PersistenceLayer::with_data_dir(dir.path()).await.unwrap();
    let id = first.orders.next_order_id().await.unwrap();
    first.orders.save(&zinger(id, "alice")).await.unwrap();
    drop(first);

    let second = PersistenceLayer::with_data_dir(dir.path()).await.unwrap();
    assert_eq!(second.orders.get(id).await.unwrap().unwrap().customer_id, "alice");
    let next = second.orders.next_order_id().await.unwrap();
    assert!(next > id, "id {} handed out again", next);
    assert_eq!(second.orders.list_for_customer("alice", 5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn in_memory_layer_is_isolated() {
    let a = PersistenceLayer::in_memory();
    let b = PersistenceLayer::in_memory();

    let id = a.orders.next_order_id().await.unwrap();
    a.orders.save(&zinger(id, "alice")).await.unwrap();

    assert_eq!(a.orders.get(id).await.unwrap().unwrap().total_amount(), 550.0);
    assert!(b.orders.get(id).await.unwrap().is_none());
}
