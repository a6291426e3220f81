// ═══════════════════════════════════════════════════════════════════
// Client Tests — chat assistant and system status with mock backends
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use student_bank_core::clients::traits::{ChatClient, StatusSource};
use student_bank_core::errors::CoreError;
use student_bank_core::models::chat::{ChatMessage, ChatRole, ChatTopic};
use student_bank_core::models::status::StatusResponse;
use student_bank_core::services::chat_service::{
    ChatContext, ChatService, CHAT_ERROR_MESSAGE, GREETING_REPLY, MAX_HISTORY,
};
use student_bank_core::services::status_service::{
    probe, storage_pct, StatusMonitor, StatusService, StorageGauge,
};
use student_bank_core::storage::store::STORAGE_QUOTA_BYTES;

/// Replies with a fixed text and records every request.
struct ScriptedChat {
    reply: Result<String, String>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedChat {
    fn ok(reply: &str) -> (Self, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reply: Ok(reply.to_string()),
                requests: Arc::clone(&requests),
            },
            requests,
        )
    }

    fn failing() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CoreError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.reply.clone().map_err(CoreError::Network)
    }
}

struct FixedStatus {
    response: Option<StatusResponse>,
    calls: Arc<AtomicUsize>,
}

impl FixedStatus {
    fn up() -> Self {
        Self {
            response: Some(StatusResponse {
                status: "ok".into(),
                uptime: Some(43_200.0),
                version: Some("1.2.0".into()),
            }),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn down() -> Self {
        Self {
            response: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl StatusSource for FixedStatus {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch(&self) -> Result<StatusResponse, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or_else(|| CoreError::Network("unreachable".into()))
    }
}

fn ctx() -> ChatContext {
    ChatContext {
        student_count: 3,
        total_balance: 1250.0,
        currency_symbol: "₹".into(),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Topic detection
// ═══════════════════════════════════════════════════════════════════

mod topics {
    use super::*;

    #[test]
    fn keywords_map_to_topics() {
        let cases = [
            ("How do I withdraw money?", ChatTopic::Withdraw),
            ("Make a DEPOSIT please", ChatTopic::Deposit),
            ("what is my balance", ChatTopic::Balance),
            ("download a monthly report", ChatTopic::Report),
            ("export statement", ChatTopic::Report),
            ("edit a student profile", ChatTopic::Account),
            ("tips to save money", ChatTopic::Saving),
            ("Hello there", ChatTopic::Greeting),
            ("namaste!", ChatTopic::Greeting),
            ("what is interest?", ChatTopic::General),
        ];
        for (message, expected) in cases {
            assert_eq!(ChatService::detect_topic(message), expected, "{message}");
        }
    }

    #[test]
    fn priority_order_wins() {
        assert_eq!(
            ChatService::detect_topic("hi, deposit then withdraw"),
            ChatTopic::Withdraw
        );
        assert_eq!(ChatService::detect_topic("hello, my balance?"), ChatTopic::Balance);
    }

    #[test]
    fn greeting_needs_a_whole_word() {
        assert_eq!(ChatService::detect_topic("this thing"), ChatTopic::General);
    }

    #[test]
    fn system_prompt_quotes_context() {
        let prompt = ChatService::system_prompt(ChatTopic::Withdraw, &ctx());
        assert!(prompt.contains("3 student accounts"));
        assert!(prompt.contains("₹1250.00"));
        assert!(prompt.contains("cannot exceed"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Chat service
// ═══════════════════════════════════════════════════════════════════

mod chat {
    use super::*;

    #[tokio::test]
    async fn reply_is_logged_with_question() {
        let (client, requests) = ScriptedChat::ok("Select a student and enter an amount.");
        let mut chat = ChatService::new(Box::new(client));
        let reply = chat.send("how to deposit?", &ctx()).await.unwrap();

        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, "Select a student and enter an amount.");
        assert_eq!(chat.history().len(), 2);
        assert_eq!(chat.history()[0], ChatMessage::user("how to deposit?"));

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0].role, ChatRole::System);
        assert_eq!(sent[0].last().unwrap(), &ChatMessage::user("how to deposit?"));
    }

    #[tokio::test]
    async fn greeting_skips_the_network() {
        let (client, requests) = ScriptedChat::ok("unused");
        let mut chat = ChatService::new(Box::new(client));
        let reply = chat.send("hey", &ctx()).await.unwrap();
        assert_eq!(reply.content, GREETING_REPLY);
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_becomes_friendly_message() {
        let mut chat = ChatService::new(Box::new(ScriptedChat::failing()));
        let reply = chat.send("what is my balance", &ctx()).await.unwrap();
        assert_eq!(reply.content, CHAT_ERROR_MESSAGE);
        assert_eq!(chat.history().len(), 2);
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let mut chat = ChatService::new(Box::new(ScriptedChat::failing()));
        assert!(matches!(
            chat.send("   ", &ctx()).await,
            Err(CoreError::Validation(_))
        ));
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn context_window_is_bounded() {
        let (client, requests) = ScriptedChat::ok("ok");
        let mut chat = ChatService::new(Box::new(client));
        for i in 0..8 {
            chat.send(&format!("question {i} about my balance"), &ctx()).await.unwrap();
        }
        let sent = requests.lock().unwrap();
        // system prompt + 10 earlier turns + the new question
        assert_eq!(sent.last().unwrap().len(), 12);
        drop(sent);

        chat.clear();
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn long_conversation_keeps_newest_messages() {
        let (client, _requests) = ScriptedChat::ok("ok");
        let mut chat = ChatService::new(Box::new(client));
        for i in 0..40 {
            chat.send(&format!("question {i} about my balance"), &ctx()).await.unwrap();
        }

        assert_eq!(chat.history().len(), MAX_HISTORY);
        assert_eq!(
            chat.history()[MAX_HISTORY - 2],
            ChatMessage::user("question 39 about my balance")
        );
        assert_eq!(chat.history()[0], ChatMessage::user("question 15 about my balance"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// System status
// ═══════════════════════════════════════════════════════════════════

mod status {
    use super::*;

    #[test]
    fn derive_healthy_endpoint() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let resp = StatusResponse {
            status: "OK".into(),
            uptime: Some(43_200.0),
            version: Some("1.2.0".into()),
        };
        let status = StatusService::derive(&resp, 42, STORAGE_QUOTA_BYTES / 4, at);
        assert!(status.online);
        assert_eq!(status.api_health, 100.0);
        assert_eq!(status.uptime_pct, 50.0);
        assert_eq!(status.storage_used_pct, 25.0);
        assert_eq!(status.latency_ms, 42);
        assert_eq!(status.checked_at, at);
    }

    #[test]
    fn derive_degraded_endpoint() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let resp = StatusResponse {
            status: "maintenance".into(),
            uptime: None,
            version: None,
        };
        let status = StatusService::derive(&resp, 5, 0, at);
        assert!(status.online);
        assert_eq!(status.api_health, 0.0);
        assert_eq!(status.uptime_pct, 0.0);
    }

    #[test]
    fn uptime_is_capped() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let resp = StatusResponse {
            status: "up".into(),
            uptime: Some(10.0 * 86_400.0),
            version: None,
        };
        assert_eq!(StatusService::derive(&resp, 0, 0, at).uptime_pct, 100.0);
    }

    #[test]
    fn storage_pct_is_capped() {
        assert_eq!(storage_pct(0), 0.0);
        assert_eq!(storage_pct(STORAGE_QUOTA_BYTES * 2), 100.0);
    }

    #[test]
    fn gauge_is_shared_between_clones() {
        let gauge = StorageGauge::new();
        let other = gauge.clone();
        gauge.set(1234);
        assert_eq!(other.get(), 1234);
    }

    #[tokio::test]
    async fn probe_failure_is_offline() {
        let status = probe(&FixedStatus::down(), 0).await;
        assert!(!status.online);
        assert_eq!(status.api_health, 0.0);
    }

    #[tokio::test]
    async fn service_check_uses_source() {
        let source = Arc::new(FixedStatus::up());
        let calls = Arc::clone(&source.calls);
        let service = StatusService::new(source);
        let status = service.check(0).await;
        assert!(status.online);
        assert_eq!(status.version.as_deref(), Some("1.2.0"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.source().name(), "fixed");
    }

    #[tokio::test]
    async fn monitor_publishes_snapshots() {
        let source = Arc::new(FixedStatus::up());
        let calls = Arc::clone(&source.calls);
        let gauge = StorageGauge::new();
        gauge.set(STORAGE_QUOTA_BYTES / 2);
        let mut monitor = StatusMonitor::spawn(source, Duration::from_millis(10), gauge);

        let first = tokio::time::timeout(Duration::from_secs(2), monitor.next())
            .await
            .expect("first poll")
            .expect("snapshot");
        assert!(first.online);
        assert_eq!(first.storage_used_pct, 50.0);

        tokio::time::timeout(Duration::from_secs(2), monitor.next())
            .await
            .expect("second poll");
        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert!(monitor.latest().is_some());

        monitor.stop();
    }
}
