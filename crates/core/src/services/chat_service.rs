use tracing::{debug, warn};

use crate::clients::traits::ChatClient;
use crate::errors::CoreError;
use crate::models::chat::{ChatMessage, ChatTopic};

/// Replaces the assistant reply whenever the completion call fails.
pub const CHAT_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

pub const GREETING_REPLY: &str =
    "Hello! I'm the JDSA banking assistant. Ask me about balances, deposits, withdrawals, reports or saving tips.";

/// Turns of earlier conversation sent along with each request.
const CONTEXT_TURNS: usize = 10;

/// Messages kept in the conversation log; the oldest are dropped first.
pub const MAX_HISTORY: usize = 50;

/// Figures the canned prompts may quote.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatContext {
    pub student_count: usize,
    pub total_balance: f64,
    pub currency_symbol: String,
}

/// The assistant widget: topic detection, canned prompts, conversation log.
pub struct ChatService {
    client: Box<dyn ChatClient>,
    history: Vec<ChatMessage>,
}

impl ChatService {
    pub fn new(client: Box<dyn ChatClient>) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }

    /// Keyword match, checked in a fixed priority order.
    #[must_use]
    pub fn detect_topic(message: &str) -> ChatTopic {
        let lower = message.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |needle: &str| lower.contains(needle);

        if has("withdraw") {
            ChatTopic::Withdraw
        } else if has("deposit") {
            ChatTopic::Deposit
        } else if has("balance") {
            ChatTopic::Balance
        } else if has("report") || has("statement") || has("export") {
            ChatTopic::Report
        } else if has("account") || has("student") || has("profile") {
            ChatTopic::Account
        } else if has("save") || has("saving") || has("budget") {
            ChatTopic::Saving
        } else if words
            .iter()
            .any(|w| matches!(*w, "hi" | "hello" | "hey" | "namaste"))
        {
            ChatTopic::Greeting
        } else {
            ChatTopic::General
        }
    }

    #[must_use]
    pub fn system_prompt(topic: ChatTopic, ctx: &ChatContext) -> String {
        let base = format!(
            "You are the assistant of the JDSA student bank, a teaching demo. \
             There are {} student accounts holding {}{:.2} in total. \
             Keep answers short and friendly.",
            ctx.student_count, ctx.currency_symbol, ctx.total_balance
        );
        let focus = match topic {
            ChatTopic::Balance => {
                "Explain how a balance is the sum of deposits minus withdrawals and where to see it on the dashboard."
            }
            ChatTopic::Deposit => {
                "Explain how to make a deposit: select a student, enter a positive amount and an optional reason."
            }
            ChatTopic::Withdraw => {
                "Explain withdrawals: the amount must be positive and cannot exceed the student's balance."
            }
            ChatTopic::Report => {
                "Explain daily, monthly, yearly and individual reports and that they download as PDF or Excel."
            }
            ChatTopic::Account => {
                "Explain how to create, edit or delete a student account and what details it stores."
            }
            ChatTopic::Saving => "Give simple, age-appropriate saving and budgeting tips for students.",
            ChatTopic::Greeting | ChatTopic::General => {
                "Answer general questions about student banking and money basics."
            }
        };
        format!("{base} {focus}")
    }

    /// Ask the assistant. Never fails on network problems: the reply is
    /// replaced by [`CHAT_ERROR_MESSAGE`]. Both turns are logged, up to
    /// [`MAX_HISTORY`] messages.
    pub async fn send(&mut self, message: &str, ctx: &ChatContext) -> Result<ChatMessage, CoreError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CoreError::Validation("Please type a message".into()));
        }

        let topic = Self::detect_topic(message);
        debug!(?topic, "chat message");

        let reply = if topic == ChatTopic::Greeting {
            GREETING_REPLY.to_string()
        } else {
            let mut request = Vec::with_capacity(CONTEXT_TURNS + 2);
            request.push(ChatMessage::system(Self::system_prompt(topic, ctx)));
            let skip = self.history.len().saturating_sub(CONTEXT_TURNS);
            request.extend(self.history.iter().skip(skip).cloned());
            request.push(ChatMessage::user(message));

            match self.client.complete(&request).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(client = self.client.name(), error = %e, "chat completion failed");
                    CHAT_ERROR_MESSAGE.to_string()
                }
            }
        };

        self.history.push(ChatMessage::user(message));
        let reply = ChatMessage::assistant(reply);
        self.history.push(reply.clone());
        let excess = self.history.len().saturating_sub(MAX_HISTORY);
        self.history.drain(..excess);
        Ok(reply)
    }

    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
