//! Test doubles and common utilities for poll loop contract tests
//!
//! These doubles record every call so tests can assert on exactly what the
//! poll loop asked of its collaborators.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{IpResolver, RecordReader, RecordUpdater};
use ddns_core::{PollComponents, PollConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An IpResolver that returns a fixed answer, optionally after a delay
pub struct StaticIpResolver {
    answer: Mutex<std::result::Result<String, String>>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl StaticIpResolver {
    pub fn new(ip: &str) -> Self {
        Self {
            answer: Mutex::new(Ok(ip.to_string())),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Mutex::new(Err(message.to_string())),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change what subsequent calls return
    pub fn set_ip(&self, ip: &str) {
        *self.answer.lock().unwrap() = Ok(ip.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for StaticIpResolver {
    async fn current_ip(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let answer = self.answer.lock().unwrap().clone();
        answer.map_err(|message| Error::network("public-ip", message))
    }
}

/// A RecordReader backed by a fixed record IP and a fixed raw listing
pub struct MockRecordReader {
    record_ip: Mutex<std::result::Result<String, String>>,
    listing: String,
    record_ip_calls: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
    queried: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockRecordReader {
    pub fn new(record_ip: &str) -> Self {
        Self::with_listing(record_ip, r#"{"records": []}"#)
    }

    pub fn with_listing(record_ip: &str, listing: &str) -> Self {
        Self {
            record_ip: Mutex::new(Ok(record_ip.to_string())),
            listing: listing.to_string(),
            record_ip_calls: Arc::new(AtomicUsize::new(0)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            queried: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        let reader = Self::new("");
        *reader.record_ip.lock().unwrap() = Err(message.to_string());
        reader
    }

    pub fn set_record_ip(&self, ip: &str) {
        *self.record_ip.lock().unwrap() = Ok(ip.to_string());
    }

    pub fn record_ip_call_count(&self) -> usize {
        self.record_ip_calls.load(Ordering::SeqCst)
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// `(record, domain)` pairs passed to record_ip()
    pub fn queried(&self) -> Vec<(String, String)> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordReader for MockRecordReader {
    async fn record_ip(&self, record: &str, domain: &str) -> Result<String> {
        self.record_ip_calls.fetch_add(1, Ordering::SeqCst);
        self.queried
            .lock()
            .unwrap()
            .push((record.to_string(), domain.to_string()));
        let answer = self.record_ip.lock().unwrap().clone();
        answer.map_err(|message| Error::timeout("record-ip", message))
    }

    async fn list_records(&self, _domain: &str) -> Result<String> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.listing.clone())
    }
}

/// One update call as seen by MockRecordUpdater
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub record: String,
    pub domain: String,
    pub record_id: String,
    pub new_ip: String,
}

/// A RecordUpdater that records calls and replies like the provider would
pub struct MockRecordUpdater {
    reply: String,
    delay: Duration,
    calls: Arc<Mutex<Vec<UpdateCall>>>,
    completed: Arc<AtomicUsize>,
}

impl MockRecordUpdater {
    /// Replies with a body containing the success marker
    pub fn accepting() -> Self {
        Self::replying(r#"{"status":{"code":"1","message":"Action completed successful"}}"#)
    }

    /// Replies with the given raw body
    pub fn replying(body: &str) -> Self {
        Self {
            reply: body.to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Updates that ran to completion (not cancelled mid-delay)
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordUpdater for MockRecordUpdater {
    async fn update(
        &self,
        record: &str,
        domain: &str,
        record_id: &str,
        new_ip: &str,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(UpdateCall {
            record: record.to_string(),
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            new_ip: new_ip.to_string(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        if self.reply.contains("successful") {
            Ok(())
        } else {
            Err(Error::update_rejected(self.reply.clone()))
        }
    }
}

/// A valid configuration for `test.example.com`
pub fn test_config() -> PollConfig {
    PollConfig::new("example.com", "test", "12345,secret")
}

/// Bundle concrete doubles so tests keep their own handles for assertions
pub fn components(
    resolver: &Arc<StaticIpResolver>,
    reader: &Arc<MockRecordReader>,
    updater: &Arc<MockRecordUpdater>,
) -> PollComponents {
    PollComponents::new(resolver.clone(), reader.clone(), updater.clone())
}

/// Record listing JSON with one A record named `test` and id `42`
pub fn listing_with_test_record() -> &'static str {
    r#"{"status":{"code":"1","message":"Action completed successful"},
        "records":[{"id":"42","name":"test","type":"A","value":"1.1.1.1"}]}"#
}
