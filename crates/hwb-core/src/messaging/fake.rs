use std::sync::Mutex;

use async_trait::async_trait;

use crate::{domain::ChatId, messaging::port::MessagingPort, Error, Result};

/// In-memory messenger recording every send.
#[derive(Default)]
pub(crate) struct FakeMessenger {
    pub sends: Mutex<Vec<(ChatId, String)>>,
    pub fail: Mutex<bool>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: Mutex::new(true),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn texts(&self) -> Vec<String> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(Error::Notification("chat not found".to_string()));
        }
        self.sends.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
