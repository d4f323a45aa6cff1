//! Public chat room on the `messages` channel topic.

use serde::{Deserialize, Serialize};

use crate::applets::{Applet, AppletContext, arg, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::platform::{ChannelEvent, SubscriptionHandle};
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

pub const CHAT_TOPIC: &str = "messages";

const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub content: String,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub user_id: String,
}

impl ChatMessage {
    fn from_record(record: serde_json::Value) -> Option<Self> {
        match serde_json::from_value(record) {
            Ok(msg) => Some(msg),
            Err(e) => {
                log::warn!("Skipping malformed chat record: {e}");
                None
            },
        }
    }
}

pub struct ChatApplet {
    messages: Vec<ChatMessage>,
    subscription: Option<SubscriptionHandle>,
}

impl ChatApplet {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            subscription: None,
        }
    }

    /// Oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Append a new message, or replace one already shown.
    fn insert(&mut self, msg: ChatMessage) {
        match self.messages.iter_mut().find(|m| m.id == msg.id) {
            Some(existing) => *existing = msg,
            None => self.messages.push(msg),
        }
    }

    fn update(&mut self, msg: ChatMessage) {
        if let Some(existing) = self.messages.iter_mut().find(|m| m.id == msg.id) {
            *existing = msg;
        }
    }

    pub fn send(&mut self, text: &str, cx: &mut AppletContext<'_>) -> Result<()> {
        if text.trim().is_empty() {
            return Err(HandsetError::Validation("message is empty".into()));
        }
        let record = serde_json::json!({
            "content": text,
            "created_at": cx.unix_secs(),
            "likes": 0,
            "user_id": ANONYMOUS,
        });
        cx.services.channel.publish(CHAT_TOPIC, record)
    }

    /// Publish the message with one more like. The shown count changes when
    /// the update comes back over the channel.
    pub fn like(&mut self, id: u64, cx: &mut AppletContext<'_>) -> Result<()> {
        let msg = self
            .messages
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| HandsetError::Validation(format!("no message {id}")))?;
        let liked = ChatMessage {
            likes: msg.likes.saturating_add(1),
            ..msg.clone()
        };
        cx.services
            .channel
            .publish(CHAT_TOPIC, serde_json::to_value(&liked)?)
    }
}

impl Default for ChatApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for ChatApplet {
    fn id(&self) -> AppId {
        AppId::Chat
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        self.subscription = Some(cx.services.channel.subscribe(CHAT_TOPIC)?);
        cx.request(FetchJob::ChannelHistory(CHAT_TOPIC.into()));
        Ok(())
    }

    fn on_unmount(&mut self, cx: &mut AppletContext<'_>) {
        if let Some(handle) = self.subscription.take() {
            cx.services.channel.unsubscribe(handle);
        }
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "send" | "say" => self.send(&rest(args), cx),
            "like" => self.like(arg(args, 0, "message id")?, cx),
            other => Err(unknown_command(self.id(), other)),
        }
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        match result {
            FetchResult::ChannelHistory { topic, records } if topic == CHAT_TOPIC => {
                let mut history: Vec<ChatMessage> = records?
                    .into_iter()
                    .filter_map(ChatMessage::from_record)
                    .collect();
                history.sort_by_key(|m| (m.created_at, m.id));
                // Keep anything the subscription delivered first.
                for msg in std::mem::take(&mut self.messages) {
                    if !history.iter().any(|m| m.id == msg.id) {
                        history.push(msg);
                    }
                }
                self.messages = history;
            },
            FetchResult::ChannelEvents(events) => {
                for event in events? {
                    match event {
                        ChannelEvent::Insert(record) => {
                            if let Some(msg) = ChatMessage::from_record(record) {
                                self.insert(msg);
                            }
                        },
                        ChannelEvent::Update(record) => {
                            if let Some(msg) = ChatMessage::from_record(record) {
                                self.update(msg);
                            }
                        },
                    }
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn poll_jobs(&self) -> Vec<FetchJob> {
        self.subscription
            .map(FetchJob::ChannelPoll)
            .into_iter()
            .collect()
    }

    fn view(&self) -> Vec<String> {
        let mut lines = vec!["Chat Room".to_string()];
        if self.messages.is_empty() {
            lines.push("No messages yet. Say hello!".into());
        }
        lines.extend(self.messages.iter().map(|m| {
            format!(
                "#{} {}  <3 {}  ({})",
                m.id,
                m.content,
                m.likes,
                if m.user_id == ANONYMOUS || m.user_id.is_empty() {
                    "Anonymous"
                } else {
                    m.user_id.as_str()
                }
            )
        }));
        lines
    }
}
