#[cfg(test)]
mod tests {
    use crate::event_bus::EventBus;
    use crate::persistence::{PanelLayout, PersistenceAdapter};
    use crate::ports::*;
    use crate::scroll::*;
    use crate::seed;
    use crate::store::{send_message, SessionStore, FALLBACK_REPLY};
    use chat_types::config::{ChatConfig, ScrollConfig, StorageConfig};
    use chat_types::event::ChatEvent;
    use chat_types::message::*;
    use chat_types::session::*;
    use chat_types::ChatError;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    // ─── Mock ports ──────────────────────────────────────────

    /// Key-value store backed by a HashMap
    #[derive(Default)]
    struct MockStorage {
        data: RefCell<HashMap<String, String>>,
    }

    impl MockStorage {
        fn with(entries: &[(&str, &str)]) -> Rc<Self> {
            let storage = Self::default();
            for (k, v) in entries {
                storage.data.borrow_mut().insert(k.to_string(), v.to_string());
            }
            Rc::new(storage)
        }

        fn raw(&self, key: &str) -> Option<String> {
            self.data.borrow().get(key).cloned()
        }
    }

    impl StoragePort for MockStorage {
        fn get(&self, key: &str) -> chat_types::Result<Option<String>> {
            Ok(self.data.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> chat_types::Result<()> {
            self.data.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: &str) -> chat_types::Result<()> {
            self.data.borrow_mut().remove(key);
            Ok(())
        }

        fn list_keys(&self, prefix: &str) -> chat_types::Result<Vec<String>> {
            Ok(self
                .data
                .borrow()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }

        fn backend_name(&self) -> &str {
            "mock"
        }
    }

    /// Storage where every operation fails (quota exceeded, private mode)
    struct BrokenStorage;

    impl StoragePort for BrokenStorage {
        fn get(&self, _key: &str) -> chat_types::Result<Option<String>> {
            Err(ChatError::Persistence("denied".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> chat_types::Result<()> {
            Err(ChatError::Persistence("quota exceeded".to_string()))
        }

        fn delete(&self, _key: &str) -> chat_types::Result<()> {
            Err(ChatError::Persistence("denied".to_string()))
        }

        fn list_keys(&self, _prefix: &str) -> chat_types::Result<Vec<String>> {
            Err(ChatError::Persistence("denied".to_string()))
        }

        fn backend_name(&self) -> &str {
            "broken"
        }
    }

    /// Gateway that answers with a fixed result and records what it was sent
    struct MockGateway {
        outcome: chat_types::Result<AssistantReply>,
        calls: RefCell<Vec<(String, Mode)>>,
    }

    impl MockGateway {
        fn replying(text: &str) -> Self {
            Self {
                outcome: Ok(AssistantReply::text(text)),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(err: ChatError) -> Self {
            Self {
                outcome: Err(err),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl GatewayPort for MockGateway {
        async fn send(&self, message: &str, mode: Mode) -> chat_types::Result<AssistantReply> {
            self.calls.borrow_mut().push((message.to_string(), mode));
            self.outcome.clone()
        }

        async fn check_health(&self) -> chat_types::Result<bool> {
            Ok(self.outcome.is_ok())
        }
    }

    /// Gateway whose requests never complete
    struct HangingGateway;

    #[async_trait(?Send)]
    impl GatewayPort for HangingGateway {
        async fn send(&self, _message: &str, _mode: Mode) -> chat_types::Result<AssistantReply> {
            futures::future::pending().await
        }

        async fn check_health(&self) -> chat_types::Result<bool> {
            futures::future::pending().await
        }
    }

    fn open_store(storage: Rc<dyn StoragePort>) -> (SessionStore, EventBus) {
        let bus = EventBus::new();
        let store = SessionStore::open(&ChatConfig::default(), storage, bus.clone());
        (store, bus)
    }

    fn empty_store() -> (RefCell<SessionStore>, EventBus, Rc<MockStorage>) {
        let storage = MockStorage::with(&[]);
        let (mut store, bus) = open_store(storage.clone());
        // start from a truly empty collection
        let ids: Vec<String> = store.sessions().iter().map(|s| s.id.clone()).collect();
        for id in ids {
            store.delete_session(&id).unwrap();
        }
        let _ = bus.drain();
        (RefCell::new(store), bus, storage)
    }

    // ─── EventBus Tests ──────────────────────────────────────

    #[test]
    fn test_event_bus_emit_and_drain() {
        let bus = EventBus::new();
        assert!(!bus.has_pending());
        bus.emit(ChatEvent::LoadingChanged { loading: true });
        bus.emit(ChatEvent::LoadingChanged { loading: false });
        assert!(bus.has_pending());

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(!bus.has_pending());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_event_bus_clone_shares_queue() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();
        bus1.emit(ChatEvent::SessionCreated { session_id: "a".to_string() });
        assert_eq!(bus2.drain().len(), 1);
        assert!(!bus1.has_pending());
    }

    #[test]
    fn test_event_bus_drops_oldest_when_full() {
        let bus = EventBus::with_capacity(2);
        for id in ["a", "b", "c"] {
            bus.emit(ChatEvent::SessionCreated { session_id: id.to_string() });
        }
        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                ChatEvent::SessionCreated { session_id: "b".to_string() },
                ChatEvent::SessionCreated { session_id: "c".to_string() },
            ]
        );
    }

    // ─── Persistence Tests ───────────────────────────────────

    fn adapter(storage: Rc<dyn StoragePort>) -> PersistenceAdapter {
        PersistenceAdapter::new(storage, &StorageConfig::default())
    }

    #[test]
    fn test_load_missing_keys_gives_defaults() {
        let loaded = adapter(MockStorage::with(&[])).load();
        assert!(loaded.sessions.is_empty());
        assert!(loaded.active_id.is_none());
        assert!(!loaded.sidebar_collapsed);
    }

    #[test]
    fn test_load_malformed_json_gives_defaults() {
        let storage = MockStorage::with(&[
            ("chat:sessions", "{not json"),
            ("chat:active_session", "ghost"),
            ("chat:sidebar_collapsed", "maybe"),
        ]);
        let loaded = adapter(storage).load();
        assert!(loaded.sessions.is_empty());
        assert!(loaded.active_id.is_none());
        assert!(!loaded.sidebar_collapsed);
    }

    #[test]
    fn test_load_unknown_mode_is_malformed() {
        let storage = MockStorage::with(&[(
            "chat:sessions",
            r#"[{"id":"a","title":"t","messages":[],"created_at":"2024-01-01T00:00:00Z","mode":"poetic"}]"#,
        )]);
        assert!(adapter(storage).load().sessions.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let storage = MockStorage::with(&[]);
        let persistence = adapter(storage.clone());

        let mut first = ChatSession::new(Mode::Spiritual);
        first.messages.push(Message::user("one"));
        first.messages.push(Message::assistant("two"));
        let second = ChatSession::new(Mode::General);
        let sessions = vec![first.clone(), second.clone()];

        persistence.save(&sessions, Some(&second.id));
        let loaded = persistence.load();

        assert_eq!(loaded.sessions, sessions);
        assert_eq!(loaded.active_id.as_deref(), Some(second.id.as_str()));
        assert_eq!(loaded.sessions[0].messages[0].content, "one");
        assert_eq!(loaded.sessions[0].messages[1].content, "two");
        assert_eq!(loaded.sessions[0].created_at, first.created_at);
    }

    #[test]
    fn test_load_revalidates_stale_active_id() {
        let storage = MockStorage::with(&[]);
        let persistence = adapter(storage.clone());
        let session = ChatSession::new(Mode::General);
        persistence.save(std::slice::from_ref(&session), Some("deleted-elsewhere"));

        let loaded = persistence.load();
        assert_eq!(loaded.active_id.as_deref(), Some(session.id.as_str()));
    }

    #[test]
    fn test_save_without_active_removes_key() {
        let storage = MockStorage::with(&[("chat:active_session", "old")]);
        adapter(storage.clone()).save(&[], None);
        assert!(storage.raw("chat:active_session").is_none());
        assert_eq!(storage.raw("chat:sessions").as_deref(), Some("[]"));
    }

    #[test]
    fn test_load_repairs_duplicates_and_empty_titles() {
        let mut a = ChatSession::new(Mode::General);
        a.title = "  ".to_string();
        let mut dup = a.clone();
        dup.title = "duplicate".to_string();
        let json = serde_json::to_string(&vec![a.clone(), dup]).unwrap();
        let storage = MockStorage::with(&[("chat:sessions", json.as_str())]);

        let loaded = adapter(storage).load();
        assert_eq!(loaded.sessions.len(), 1);
        assert_eq!(loaded.sessions[0].title, DEFAULT_TITLE);
    }

    #[test]
    fn test_timestamps_persist_as_iso_strings() {
        let storage = MockStorage::with(&[]);
        adapter(storage.clone()).save(&[ChatSession::new(Mode::General)], None);
        let raw: serde_json::Value =
            serde_json::from_str(&storage.raw("chat:sessions").unwrap()).unwrap();
        let stamp = raw[0]["created_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_namespace_prefixes_keys() {
        let storage = MockStorage::with(&[]);
        let config = StorageConfig {
            namespace: "faith".to_string(),
            ..StorageConfig::default()
        };
        PersistenceAdapter::new(storage.clone(), &config).save_sidebar_collapsed(true);
        assert_eq!(storage.raw("faith:sidebar_collapsed").as_deref(), Some("true"));
    }

    #[test]
    fn test_layout_roundtrip_and_clamp() {
        let storage = MockStorage::with(&[]);
        let persistence = adapter(storage.clone());
        assert_eq!(persistence.load_layout(), PanelLayout::default());

        persistence.save_layout(&PanelLayout { sidebar_ratio: 0.3 });
        assert_eq!(persistence.load_layout().sidebar_ratio, 0.3);

        persistence.save_layout(&PanelLayout { sidebar_ratio: 0.99 });
        assert_eq!(persistence.load_layout().sidebar_ratio, PanelLayout::MAX_SIDEBAR_RATIO);
    }

    #[test]
    fn test_broken_storage_never_propagates() {
        let persistence = adapter(Rc::new(BrokenStorage));
        persistence.save(&[ChatSession::new(Mode::General)], Some("x"));
        persistence.save_sidebar_collapsed(true);
        assert_eq!(persistence.load(), Default::default());
        assert_eq!(persistence.backend_name(), "broken");
    }

    // ─── SessionStore lifecycle Tests ────────────────────────

    #[test]
    fn test_open_empty_creates_one_session() {
        let (store, bus) = open_store(MockStorage::with(&[]));
        assert_eq!(store.sessions().len(), 1);
        let session = &store.sessions()[0];
        assert_eq!(store.active_id(), Some(session.id.as_str()));
        assert_eq!(session.mode, Mode::General);
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(!store.is_loading());
        assert!(bus
            .drain()
            .iter()
            .any(|e| matches!(e, ChatEvent::SessionCreated { .. })));
    }

    #[test]
    fn test_open_malformed_storage_creates_fresh_session() {
        let storage = MockStorage::with(&[("chat:sessions", "][")]);
        let (store, _) = open_store(storage.clone());
        assert_eq!(store.sessions().len(), 1);
        assert!(store.sessions()[0].is_empty());
        // the fresh state replaced the malformed entry
        let raw = storage.raw("chat:sessions").unwrap();
        assert!(serde_json::from_str::<Vec<ChatSession>>(&raw).is_ok());
    }

    #[test]
    fn test_open_with_seed_data() {
        let config = ChatConfig {
            seed_mock_sessions: true,
            ..ChatConfig::default()
        };
        let store = SessionStore::open(&config, MockStorage::with(&[]), EventBus::new());
        assert!(store.sessions().len() >= 2);
        assert_eq!(store.active_id(), Some(store.sessions()[0].id.as_str()));
        assert!(store.sessions().iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_seed_does_not_override_persisted_sessions() {
        let storage = MockStorage::with(&[]);
        let (first, _) = open_store(storage.clone());
        let id = first.sessions()[0].id.clone();

        let config = ChatConfig {
            seed_mock_sessions: true,
            ..ChatConfig::default()
        };
        let reopened = SessionStore::open(&config, storage, EventBus::new());
        assert_eq!(reopened.sessions().len(), 1);
        assert_eq!(reopened.sessions()[0].id, id);
    }

    #[test]
    fn test_open_restored_announces_active_session() {
        let storage = MockStorage::with(&[]);
        let (mut first, _) = open_store(storage.clone());
        let older = first.sessions()[0].id.clone();
        first.create_session(Mode::Spiritual);
        first.select_session(&older).unwrap();

        let (reopened, bus) = open_store(storage);
        assert_eq!(reopened.active_id(), Some(older.as_str()));
        assert_eq!(
            bus.drain(),
            vec![ChatEvent::ActiveChanged { session_id: Some(older) }]
        );
    }

    #[test]
    fn test_open_seeded_announces_active_session() {
        let config = ChatConfig {
            seed_mock_sessions: true,
            ..ChatConfig::default()
        };
        let bus = EventBus::new();
        let store = SessionStore::open(&config, MockStorage::with(&[]), bus.clone());
        let active = store.active_id().map(str::to_string);
        assert!(active.is_some());
        assert_eq!(bus.drain(), vec![ChatEvent::ActiveChanged { session_id: active }]);
    }

    #[test]
    fn test_create_session_goes_to_front_and_becomes_active() {
        let (mut store, _) = open_store(MockStorage::with(&[]));
        let first = store.sessions()[0].id.clone();
        let id = store.create_session(Mode::Spiritual);
        assert_eq!(store.sessions()[0].id, id);
        assert_eq!(store.sessions()[1].id, first);
        assert_eq!(store.active_id(), Some(id.as_str()));
        assert_eq!(store.active_session().unwrap().mode, Mode::Spiritual);
    }

    #[test]
    fn test_select_session() {
        let (mut store, _) = open_store(MockStorage::with(&[]));
        let older = store.sessions()[0].id.clone();
        store.create_session(Mode::General);

        store.select_session(&older).unwrap();
        assert_eq!(store.active_id(), Some(older.as_str()));

        let err = store.select_session("missing").unwrap_err();
        assert_eq!(err, ChatError::SessionNotFound("missing".to_string()));
        assert_eq!(store.active_id(), Some(older.as_str()));
    }

    #[test]
    fn test_delete_active_reassigns_to_first() {
        let (mut store, _) = open_store(MockStorage::with(&[]));
        let a = store.sessions()[0].id.clone();
        let b = store.create_session(Mode::General);
        let c = store.create_session(Mode::General);
        assert_eq!(store.active_id(), Some(c.as_str()));

        store.delete_session(&c).unwrap();
        assert_eq!(store.active_id(), Some(b.as_str()));

        store.select_session(&a).unwrap();
        store.delete_session(&b).unwrap();
        assert_eq!(store.active_id(), Some(a.as_str()));

        store.delete_session(&a).unwrap();
        assert!(store.active_id().is_none());
        assert!(store.active_session().is_none());
    }

    #[test]
    fn test_active_reference_never_dangles() {
        let (mut store, _) = open_store(MockStorage::with(&[]));
        for _ in 0..4 {
            store.create_session(Mode::General);
        }
        while let Some(id) = store.sessions().get(1).map(|s| s.id.clone()) {
            store.delete_session(&id).unwrap();
            let active = store.active_id().expect("sessions remain");
            assert!(store.session(active).is_some());
        }
        let last = store.sessions()[0].id.clone();
        store.delete_session(&last).unwrap();
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_delete_unknown_session() {
        let (mut store, _) = open_store(MockStorage::with(&[]));
        assert!(matches!(
            store.delete_session("nope"),
            Err(ChatError::SessionNotFound(_))
        ));
        assert_eq!(store.sessions().len(), 1);
    }

    #[test]
    fn test_set_session_mode() {
        let (mut store, bus) = open_store(MockStorage::with(&[]));
        let id = store.sessions()[0].id.clone();
        let _ = bus.drain();
        store.set_session_mode(&id, Mode::Spiritual).unwrap();
        assert_eq!(store.session(&id).unwrap().mode, Mode::Spiritual);
        assert_eq!(
            bus.drain(),
            vec![ChatEvent::ModeChanged { session_id: id, mode: Mode::Spiritual }]
        );
    }

    #[test]
    fn test_ui_preferences_persist() {
        let storage = MockStorage::with(&[]);
        let (mut store, _) = open_store(storage.clone());
        store.set_sidebar_collapsed(true);
        store.set_layout(PanelLayout { sidebar_ratio: 0.3 });

        let (reopened, _) = open_store(storage);
        assert!(reopened.sidebar_collapsed());
        assert_eq!(reopened.layout().sidebar_ratio, 0.3);
    }

    // ─── Quick action Tests ──────────────────────────────────

    #[test]
    fn test_quick_actions_per_mode() {
        for mode in Mode::all() {
            let actions = seed::quick_actions(*mode);
            assert_eq!(actions.len(), 4, "{:?}", mode);
            assert!(actions.iter().all(|a| !a.trim().is_empty()));
        }
        assert!(seed::quick_actions(Mode::General).contains(&"Explain quantum computing simply"));
        assert!(seed::quick_actions(Mode::Spiritual).contains(&"What is mindfulness?"));
        assert!(seed::quick_actions(Mode::General)
            .iter()
            .all(|a| !seed::quick_actions(Mode::Spiritual).contains(a)));
    }

    #[test]
    fn test_quick_action_sends_with_session_mode() {
        let (store, _, _) = empty_store();
        store.borrow_mut().create_session(Mode::Spiritual);
        let gateway = MockGateway::replying("Breathe in.");
        let prompt = seed::quick_actions(Mode::Spiritual)[0];

        block_on(send_message(&store, &gateway, prompt, None)).unwrap();

        assert_eq!(*gateway.calls.borrow(), vec![(prompt.to_string(), Mode::Spiritual)]);
        assert_eq!(store.borrow().active_session().unwrap().title, prompt);
    }

    // ─── send_message Tests ──────────────────────────────────

    #[test]
    fn test_send_hello_scenario() {
        let (store, _, _) = empty_store();
        let gateway = MockGateway::replying("Hi there");

        block_on(send_message(&store, &gateway, "Hello", Some(Mode::General))).unwrap();

        let store = store.borrow();
        assert_eq!(store.sessions().len(), 1);
        let session = store.active_session().unwrap();
        assert_eq!(session.mode, Mode::General);
        assert_eq!(session.title, "Hello");
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, Role::User);
        assert_eq!(session.messages[0].content, "Hello");
        assert_eq!(session.messages[1].role, Role::Assistant);
        assert_eq!(session.messages[1].content, "Hi there");
        assert!(!store.is_loading());
        assert_eq!(*gateway.calls.borrow(), vec![("Hello".to_string(), Mode::General)]);
    }

    #[test]
    fn test_send_timeout_appends_apology_and_clears_loading() {
        let (store, bus, _) = empty_store();
        let gateway = MockGateway::failing(ChatError::Timeout(30_000));

        block_on(send_message(&store, &gateway, "Are you there?", None)).unwrap();

        let store = store.borrow();
        let session = store.active_session().unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "Are you there?");
        assert_eq!(session.messages[1].role, Role::Assistant);
        assert_eq!(session.messages[1].content, FALLBACK_REPLY);
        assert!(!store.is_loading());

        let events = bus.drain();
        let loading: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                ChatEvent::LoadingChanged { loading } => Some(*loading),
                _ => None,
            })
            .collect();
        assert_eq!(loading, vec![true, false]);
        assert!(events.iter().any(|e| matches!(e, ChatEvent::GatewayFailed { .. })));
    }

    #[test]
    fn test_send_local_error_apologises_without_gateway_failure() {
        let (store, bus, _) = empty_store();
        let gateway = MockGateway::failing(ChatError::Serialization("bad body".to_string()));

        block_on(send_message(&store, &gateway, "hello", None)).unwrap();

        let store = store.borrow();
        let reply = store.active_session().unwrap().last_message().unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
        assert!(!bus
            .drain()
            .iter()
            .any(|e| matches!(e, ChatEvent::GatewayFailed { .. })));
    }

    #[test]
    fn test_send_grows_by_two_per_round_trip() {
        let (store, _, _) = empty_store();
        let ok = MockGateway::replying("fine");
        let down = MockGateway::failing(ChatError::Unreachable("refused".to_string()));
        let broken = MockGateway::failing(ChatError::Backend { status: 500, body: "x".into() });

        let gateways: [&dyn GatewayPort; 3] = [&ok, &down, &broken];
        for (i, gateway) in gateways.iter().cycle().take(9).enumerate() {
            block_on(send_message(&store, *gateway, &format!("msg {}", i), None)).unwrap();
            let store = store.borrow();
            let messages = &store.active_session().unwrap().messages;
            assert_eq!(messages.len(), 2 * (i + 1));
            assert_eq!(messages[2 * i].role, Role::User);
            assert_eq!(messages[2 * i + 1].role, Role::Assistant);
        }
    }

    #[test]
    fn test_send_rejects_blank_message_before_any_change() {
        let (store, bus, _) = empty_store();
        let gateway = MockGateway::replying("unused");

        let err = block_on(send_message(&store, &gateway, "   ", None)).unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert!(store.borrow().sessions().is_empty());
        assert!(gateway.calls.borrow().is_empty());
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_send_uses_session_mode_when_none_given() {
        let (store, _, _) = empty_store();
        store.borrow_mut().create_session(Mode::Spiritual);
        let gateway = MockGateway::replying("ok");

        block_on(send_message(&store, &gateway, "pray", None)).unwrap();
        assert_eq!(gateway.calls.borrow()[0].1, Mode::Spiritual);
    }

    #[test]
    fn test_send_explicit_mode_updates_session() {
        let (store, bus, _) = empty_store();
        let id = store.borrow_mut().create_session(Mode::General);
        let _ = bus.drain();
        let gateway = MockGateway::replying("ok");

        block_on(send_message(&store, &gateway, "hello", Some(Mode::Spiritual))).unwrap();
        assert_eq!(store.borrow().session(&id).unwrap().mode, Mode::Spiritual);
        assert_eq!(gateway.calls.borrow()[0].1, Mode::Spiritual);
        assert!(bus
            .drain()
            .contains(&ChatEvent::ModeChanged { session_id: id, mode: Mode::Spiritual }));
    }

    #[test]
    fn test_title_only_derived_from_first_message() {
        let (store, _, _) = empty_store();
        let gateway = MockGateway::replying("ok");
        let long = "Tell me everything you know about quiet mornings";

        block_on(send_message(&store, &gateway, long, None)).unwrap();
        block_on(send_message(&store, &gateway, "second", None)).unwrap();

        let store = store.borrow();
        let title = &store.active_session().unwrap().title;
        assert_eq!(title, "Tell me everything you know ab...");
    }

    #[test]
    fn test_send_persists_every_append() {
        let (store, _, storage) = empty_store();
        let pending = store.borrow_mut().begin_send("saved early", None).unwrap();

        let reloaded = adapter(storage.clone()).load();
        assert_eq!(reloaded.sessions[0].messages.len(), 1);
        assert!(store.borrow().is_loading());

        store
            .borrow_mut()
            .complete_send(pending, Ok(AssistantReply::text("and late")));
        let reloaded = adapter(storage).load();
        assert_eq!(reloaded.sessions[0].messages.len(), 2);
        assert_eq!(reloaded.sessions[0].messages[1].content, "and late");
    }

    #[test]
    fn test_reply_for_deleted_session_is_dropped() {
        let (store, _, _) = empty_store();
        let pending = store.borrow_mut().begin_send("hello", None).unwrap();
        let id = pending.session_id.clone();
        store.borrow_mut().delete_session(&id).unwrap();

        store
            .borrow_mut()
            .complete_send(pending, Ok(AssistantReply::text("late")));
        let store = store.borrow();
        assert!(store.sessions().is_empty());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_cancelled_send_still_settles() {
        let (store, _, _) = empty_store();
        block_on(async {
            let mut fut = Box::pin(send_message(&store, &HangingGateway, "hello", None));
            assert!(futures::poll!(fut.as_mut()).is_pending());
            assert!(store.borrow().is_loading());
            drop(fut);
        });

        let store = store.borrow();
        let messages = &store.active_session().unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, FALLBACK_REPLY);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_store_survives_broken_storage() {
        let (store, _) = open_store(Rc::new(BrokenStorage));
        let store = RefCell::new(store);
        let gateway = MockGateway::replying("still works");
        block_on(send_message(&store, &gateway, "hi", None)).unwrap();
        assert_eq!(store.borrow().active_session().unwrap().messages.len(), 2);
    }

    #[test]
    fn test_reply_kind_and_suggestions_are_kept() {
        let (store, _, _) = empty_store();
        let gateway = MockGateway {
            outcome: Ok(AssistantReply {
                text: "- one\n- two".to_string(),
                kind: Some(ContentKind::List),
                suggestions: vec!["more".to_string()],
            }),
            calls: RefCell::new(Vec::new()),
        };
        block_on(send_message(&store, &gateway, "list please", None)).unwrap();
        let store = store.borrow();
        let reply = store.active_session().unwrap().last_message().unwrap();
        assert_eq!(reply.kind, Some(ContentKind::List));
        assert_eq!(reply.suggestions, vec!["more".to_string()]);
    }

    // ─── ScrollController Tests ──────────────────────────────

    fn metrics(offset: f32) -> ScrollMetrics {
        ScrollMetrics {
            offset,
            content_height: 1000.0,
            viewport_height: 400.0,
        }
    }

    fn controller() -> ScrollController {
        ScrollController::new(ScrollConfig::default())
    }

    #[test]
    fn test_scroll_initial_state() {
        let scroll = controller();
        assert_eq!(scroll.position(), ViewportPosition::AtBottom);
        assert!(scroll.is_following(0.0));
        assert!(!scroll.show_jump_to_top());
        assert!(!scroll.show_jump_to_bottom());
        assert!(!scroll.has_new_content());
    }

    #[test]
    fn test_scroll_observe_positions() {
        let mut scroll = controller();

        scroll.observe(metrics(300.0));
        assert_eq!(scroll.position(), ViewportPosition::Scrolled);
        assert_eq!(scroll.progress(), 50.0);
        assert!(scroll.show_jump_to_top());
        assert!(scroll.show_jump_to_bottom());

        scroll.observe(metrics(0.0));
        assert_eq!(scroll.position(), ViewportPosition::AtTop);
        assert!(!scroll.show_jump_to_top());

        scroll.observe(metrics(580.0));
        assert_eq!(scroll.position(), ViewportPosition::AtBottom);
        assert!(!scroll.show_jump_to_bottom());
    }

    #[test]
    fn test_scroll_content_that_fits_is_at_bottom() {
        let mut scroll = controller();
        scroll.observe(ScrollMetrics {
            offset: 0.0,
            content_height: 200.0,
            viewport_height: 400.0,
        });
        assert_eq!(scroll.position(), ViewportPosition::AtBottom);
        assert!(scroll.is_at_top());
        assert_eq!(scroll.progress(), 100.0);
        assert!(!scroll.show_jump_to_top());
    }

    #[test]
    fn test_scroll_append_at_bottom_follows() {
        let mut scroll = controller();
        scroll.observe(metrics(600.0));
        assert_eq!(
            scroll.on_content_appended(1.0),
            Some(ScrollCommand::ToBottom { animated: true })
        );
        assert!(!scroll.has_new_content());
    }

    #[test]
    fn test_scroll_append_while_scrolled_raises_affordance() {
        let mut scroll = controller();
        scroll.observe(metrics(100.0));
        assert_eq!(scroll.on_content_appended(1.0), None);
        assert!(scroll.has_new_content());

        scroll.observe(metrics(600.0));
        assert!(!scroll.has_new_content());
    }

    #[test]
    fn test_scroll_loading_entry_forces_bottom() {
        let mut scroll = controller();
        scroll.observe(metrics(100.0));
        scroll.on_manual_input(ManualScroll::Wheel, 1.0);
        scroll.on_content_appended(1.1);

        assert_eq!(
            scroll.on_loading_changed(true, 1.2),
            Some(ScrollCommand::ToBottom { animated: true })
        );
        assert!(!scroll.has_new_content());
        assert!(!scroll.is_manual(1.2));
        assert_eq!(scroll.on_loading_changed(false, 2.0), None);
    }

    #[test]
    fn test_scroll_tick_reasserts_bottom_while_loading() {
        let mut scroll = controller();
        scroll.observe(metrics(600.0));
        scroll.on_loading_changed(true, 10.0);

        assert_eq!(scroll.tick(10.05), None);
        assert_eq!(scroll.tick(10.2), Some(ScrollCommand::ToBottom { animated: false }));
        assert_eq!(scroll.tick(10.25), None);
        assert_eq!(scroll.tick(10.4), Some(ScrollCommand::ToBottom { animated: false }));

        scroll.on_loading_changed(false, 10.5);
        assert_eq!(scroll.tick(11.0), None);
    }

    #[test]
    fn test_scroll_tick_does_not_follow_when_scrolled_away() {
        let mut scroll = controller();
        scroll.on_loading_changed(true, 0.0);
        scroll.observe(metrics(100.0));
        assert_eq!(scroll.tick(5.0), None);
    }

    #[test]
    fn test_scroll_manual_cooldown() {
        let mut scroll = controller();
        scroll.observe(metrics(600.0));

        assert_eq!(scroll.on_manual_input(ManualScroll::PageDown, 5.0), None);
        assert!(scroll.is_manual(5.5));
        assert_eq!(scroll.on_content_appended(5.5), None);
        assert!(scroll.has_new_content());

        scroll.tick(6.0);
        assert!(!scroll.is_manual(6.0));
        assert_eq!(
            scroll.on_content_appended(6.1),
            Some(ScrollCommand::ToBottom { animated: true })
        );
    }

    #[test]
    fn test_scroll_home_and_end_keys() {
        let mut scroll = controller();
        scroll.observe(metrics(300.0));
        assert_eq!(scroll.on_manual_input(ManualScroll::Home, 0.0), Some(ScrollCommand::ToTop));
        assert_eq!(
            scroll.on_manual_input(ManualScroll::End, 0.1),
            Some(ScrollCommand::ToBottom { animated: true })
        );
    }

    #[test]
    fn test_scroll_jump_buttons() {
        let mut scroll = controller();
        scroll.observe(metrics(100.0));
        scroll.on_content_appended(0.0);

        assert_eq!(scroll.jump_to_bottom(), ScrollCommand::ToBottom { animated: true });
        assert!(!scroll.has_new_content());
        assert_eq!(scroll.jump_to_top(1.0), ScrollCommand::ToTop);
        assert!(scroll.is_manual(1.5));
    }

    #[test]
    fn test_scroll_reset_keeps_loading() {
        let mut scroll = controller();
        scroll.on_loading_changed(true, 0.0);
        scroll.observe(metrics(100.0));
        scroll.on_content_appended(0.5);

        assert_eq!(scroll.reset(), ScrollCommand::ToBottom { animated: false });
        assert_eq!(scroll.position(), ViewportPosition::AtBottom);
        assert!(!scroll.has_new_content());
        assert_eq!(scroll.tick(1.0), Some(ScrollCommand::ToBottom { animated: false }));
    }
}
