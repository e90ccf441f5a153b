//! In-memory transport that records every call.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use riskbird_http::{HttpError, RequestTransport};

type Reply = Box<dyn Fn() -> Result<serde_json::Value, HttpError> + Send + Sync>;

pub struct RecordingTransport {
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    reply: Reply,
}

impl RecordingTransport {
    pub fn replying(value: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(move || Ok(value.clone())),
        })
    }

    pub fn failing(make_error: impl Fn() -> HttpError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(move || Err(make_error())),
        })
    }

    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RequestTransport for RecordingTransport {
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        self.calls.lock().push((path.to_owned(), body));
        (self.reply)()
    }
}
