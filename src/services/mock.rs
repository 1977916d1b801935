use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::ai_service::{ContentRequest, GenerativeModel};

/// Scripted model for tests: replies with fixed text or a fixed error and records every request.
pub struct MockModel {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<ContentRequest>>,
}

impl MockModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with_reply(Ok(text.to_string()))
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Self::with_reply(Err(error.to_string()))
    }

    fn with_reply(reply: std::result::Result<String, String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GenerativeModel for MockModel {
    async fn generate_content(&self, request: ContentRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        log::info!("🧪 Mock model received prompt of {} bytes", request.prompt.len());
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(error) => Err(anyhow::anyhow!(error.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
