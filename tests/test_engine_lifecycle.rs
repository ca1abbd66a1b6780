pub mod common;

use common::*;
use std::time::Duration;
use storefront_realtime::{Error, NotificationKind, Role, StreamKind, SyncEngine, UserIdentity};
use tokio::time::timeout;

#[tokio::test]
async fn empty_token_refuses_connection_without_retry() {
    let (backend, mut sessions) = fake_backend();
    let api = StubApi::with_notifications(Vec::new());
    let mut engine = SyncEngine::with_transport(engine_config(), api, backend);

    let identity = UserIdentity {
        user_id: "u1".to_string(),
        role: Role::Buyer,
        token: String::new(),
    };
    let result = engine.start(identity).await;

    assert!(matches!(result, Err(Error::MissingToken)));
    assert!(!engine.stream_connected(StreamKind::Order).await);
    assert!(!engine.stream_connected(StreamKind::Chat).await);

    // no socket was dialed, no retry is pending
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(sessions.try_recv().is_err());
}

#[tokio::test]
async fn identity_change_tears_down_and_resubscribes() {
    let (backend, mut sessions) = fake_backend();
    let api = StubApi::with_notifications(Vec::new());
    let mut engine = SyncEngine::with_transport(engine_config(), api, backend);

    engine.start(identity("u1", Role::Buyer)).await.unwrap();

    let mut old_order_server = sessions.recv().await.unwrap();
    let subscribe = old_order_server.await_subscribe().await;
    assert_eq!(subscribe.get_header("destination"), Some("/topic/orders/u1"));
    let _old_chat_server = sessions.recv().await.unwrap();

    engine.change_identity(identity("u2", Role::Seller)).await.unwrap();

    // the old socket is gone before the new subscriptions exist
    timeout(Duration::from_secs(2), old_order_server.await_closed())
        .await
        .unwrap();

    let mut new_order_server = sessions.recv().await.unwrap();
    let subscribe = new_order_server.await_subscribe().await;
    assert_eq!(
        subscribe.get_header("destination"),
        Some("/topic/seller-orders/u2")
    );
    let mut new_chat_server = sessions.recv().await.unwrap();
    let subscribe = new_chat_server.await_subscribe().await;
    assert_eq!(subscribe.get_header("destination"), Some("/queue/chat/u2"));
}

#[tokio::test]
async fn shutdown_resets_state() {
    let (backend, _sessions) = fake_backend();
    let api = StubApi::with_notifications(vec![unread_event(
        "n1",
        NotificationKind::OrderConfirmed,
    )]);
    let mut engine = SyncEngine::with_transport(engine_config(), api, backend);

    engine.start(identity("u1", Role::Buyer)).await.unwrap();
    let mut view = engine.view();
    wait_for_view(&mut view, |view| view.unread_count == 1).await;

    engine.shutdown().await;

    let current = wait_for_view(&mut view, |view| view.entries.is_empty()).await;
    assert_eq!(current.unread_count, 0);
    assert!(engine.identity().is_none());
    assert!(!engine.stream_connected(StreamKind::Order).await);

    // second shutdown is a no-op
    engine.shutdown().await;
}

#[tokio::test]
async fn reconnect_resubscribes_and_absorbs_redelivery() {
    let (backend, mut sessions) = fake_backend();
    let api = StubApi::with_notifications(Vec::new());
    let mut engine = SyncEngine::with_transport(engine_config(), api, backend);

    engine.start(identity("u1", Role::Buyer)).await.unwrap();

    let mut order_server = sessions.recv().await.unwrap();
    let subscription_id = order_server
        .await_subscribe()
        .await
        .get_header("id")
        .unwrap()
        .to_string();
    let _chat_server = sessions.recv().await.unwrap();

    order_server.push_order_notification(&subscription_id, "n1", "ORDER_CONFIRMED");
    let mut view = engine.view();
    wait_for_view(&mut view, |view| view.unread_count == 1).await;

    // break the order socket, the connection restores itself once
    drop(order_server);

    let mut restored_server = timeout(Duration::from_secs(2), sessions.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored_server.url, "ws://backend/ws/notifications");
    let restored_subscription = restored_server
        .await_subscribe()
        .await
        .get_header("id")
        .unwrap()
        .to_string();
    assert_eq!(restored_subscription, subscription_id);

    // the server replays the last event and pushes a new one
    restored_server.push_order_notification(&restored_subscription, "n1", "ORDER_CONFIRMED");
    restored_server.push_order_notification(&restored_subscription, "n2", "ORDER_SHIPPING");

    let current = wait_for_view(&mut view, |view| {
        view.entries.iter().any(|entry| entry.id == "n2")
    })
    .await;
    assert_eq!(current.entries.len(), 2);
    assert_eq!(current.unread_count, 2);
}

#[tokio::test]
async fn rehydrate_reconciles_counter_drift() {
    let (backend, _sessions) = fake_backend();
    let api = StubApi::with_notifications(vec![unread_event(
        "n1",
        NotificationKind::OrderConfirmed,
    )]);

    let mut config = engine_config();
    config.rehydrate_interval = Some(Duration::from_millis(100));
    let mut engine = SyncEngine::with_transport(config, api.clone(), backend);

    engine.start(identity("u1", Role::Buyer)).await.unwrap();
    let mut view = engine.view();
    wait_for_view(&mut view, |view| view.unread_count == 1).await;

    // another device read n1 and two new notifications arrived
    *api.notifications.lock().unwrap() = vec![
        read_event("n1", NotificationKind::OrderConfirmed),
        unread_event("n2", NotificationKind::OrderShipping),
        unread_event("n3", NotificationKind::OrderCompleted),
    ];

    let current = wait_for_view(&mut view, |view| view.entries.len() == 3).await;
    assert_eq!(current.unread_count, 2);

    engine.shutdown().await;
}
