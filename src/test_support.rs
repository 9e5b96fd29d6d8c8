//! In-memory fakes shared by unit tests

use crate::errors::{DeliveryError, PriceError};
use crate::notifications::Transport;
use crate::pricing::{Metal, PriceSource};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Price source replaying a scripted queue of replies per metal.
/// An exhausted queue keeps returning the last successful price.
pub struct FakePriceSource {
    replies: Mutex<HashMap<Metal, VecDeque<Result<f64, PriceError>>>>,
    last: Mutex<HashMap<Metal, f64>>,
    pub calls: AtomicUsize,
}

impl FakePriceSource {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            last: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, metal: Metal, reply: Result<f64, PriceError>) {
        self.replies.lock().unwrap().entry(metal).or_default().push_back(reply);
    }

    pub fn push_prices(&self, metal: Metal, prices: &[f64]) {
        for p in prices {
            self.push(metal, Ok(*p));
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FakePriceSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, metal: Metal) -> Result<f64, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.replies.lock().unwrap().get_mut(&metal).and_then(|q| q.pop_front());
        match next {
            Some(Ok(price)) => {
                self.last.lock().unwrap().insert(metal, price);
                Ok(price)
            }
            Some(Err(e)) => Err(e),
            None => self
                .last
                .lock()
                .unwrap()
                .get(&metal)
                .copied()
                .ok_or_else(|| PriceError::upstream("fake", "no scripted price")),
        }
    }
}

/// Transport that records messages; selected chats can be made to fail
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, String)>>,
    failing: Mutex<HashSet<i64>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_for(&self, chat_id: i64) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages_for(&self, chat_id: i64) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn last_for(&self, chat_id: i64) -> Option<String> {
        self.messages_for(chat_id).pop()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(DeliveryError::DeliveryFailed {
                chat_id,
                reason: "scripted failure".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
