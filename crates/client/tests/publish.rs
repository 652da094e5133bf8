//! End-to-end publish tests against an in-memory payload store and a recording
//! transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use offload_blob::{MemoryPayloadStore, PayloadPointer, PayloadStore, PayloadStoreError};
use offload_client::{Deliverer, ExtendedClient, PublishError, TransformError};
use offload_core::{
    AttributeValue, DEFAULT_PAYLOAD_SIZE_THRESHOLD, MAX_ALLOWED_ATTRIBUTES, Message,
    OffloadConfig, OffloadError, RESERVED_ATTRIBUTE_NAME, STORAGE_KEY_ATTRIBUTE, string_size,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

const BUCKET: &str = "test-bucket-name";
const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:test-topic";
const LESS_THAN_SIZE_LIMIT: usize = 3;
const MORE_THAN_SIZE_LIMIT: usize = DEFAULT_PAYLOAD_SIZE_THRESHOLD + 1;
const ARBITRARY_SMALLER_THRESHOLD: usize = 500;

// -- Test doubles --

#[derive(Debug, thiserror::Error)]
#[error("transport rejected publish: {0}")]
struct TransportError(String);

/// Transport that records every message it is asked to deliver. Clones share
/// the same record.
#[derive(Clone, Default)]
struct RecordingDeliverer {
    calls: Arc<Mutex<Vec<Message>>>,
    fail_with: Option<String>,
}

impl RecordingDeliverer {
    fn failing(reason: &str) -> Self {
        Self {
            calls: Arc::default(),
            fail_with: Some(reason.to_owned()),
        }
    }

    fn calls(&self) -> Vec<Message> {
        self.calls.lock().clone()
    }
}

impl Deliverer for RecordingDeliverer {
    type Response = String;
    type Error = TransportError;

    async fn publish(&self, message: Message) -> Result<String, TransportError> {
        self.calls.lock().push(message);
        match &self.fail_with {
            Some(reason) => Err(TransportError(reason.clone())),
            None => Ok(format!("message-{}", self.calls.lock().len())),
        }
    }
}

/// Store that counts writes and can be told to fail.
struct CountingStore {
    inner: MemoryPayloadStore,
    writes: AtomicUsize,
    keyed_writes: AtomicUsize,
    fail: bool,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryPayloadStore::new(BUCKET),
            writes: AtomicUsize::new(0),
            keyed_writes: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst) + self.keyed_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayloadStore for CountingStore {
    async fn store(&self, payload: &str) -> Result<String, PayloadStoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PayloadStoreError::Storage("access denied".into()));
        }
        self.inner.store(payload).await
    }

    async fn store_with_key(&self, payload: &str, key: &str) -> Result<String, PayloadStoreError> {
        self.keyed_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PayloadStoreError::Storage("access denied".into()));
        }
        self.inner.store_with_key(payload, key).await
    }
}

/// Store whose writes hang until released.
#[derive(Default)]
struct StalledStore {
    release: Notify,
    started: AtomicBool,
    completed: AtomicUsize,
}

#[async_trait]
impl PayloadStore for StalledStore {
    async fn store(&self, payload: &str) -> Result<String, PayloadStoreError> {
        self.started.store(true, Ordering::SeqCst);
        self.release.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(format!("stored-{}", payload.len()))
    }

    async fn store_with_key(&self, payload: &str, key: &str) -> Result<String, PayloadStoreError> {
        self.started.store(true, Ordering::SeqCst);
        self.release.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{key}-{}", payload.len()))
    }
}

// -- Fixtures --

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn body(len: usize) -> String {
    "x".repeat(len)
}

fn default_config() -> OffloadConfig {
    OffloadConfig::new()
        .with_payload_support_enabled(BUCKET)
        .with_payload_size_threshold(DEFAULT_PAYLOAD_SIZE_THRESHOLD)
}

struct Harness {
    client: ExtendedClient<RecordingDeliverer>,
    transport: RecordingDeliverer,
    store: Arc<CountingStore>,
}

fn harness(config: OffloadConfig) -> Harness {
    harness_with(config, RecordingDeliverer::default(), CountingStore::new())
}

fn harness_with(
    config: OffloadConfig,
    transport: RecordingDeliverer,
    store: CountingStore,
) -> Harness {
    init_tracing();
    let store = Arc::new(store);
    let client = ExtendedClient::new(transport.clone(), store.clone(), config).unwrap();
    Harness {
        client,
        transport,
        store,
    }
}

// -- Offload path --

#[tokio::test]
async fn large_message_is_stored_and_pointer_published() {
    let h = harness(default_config());
    let original = body(MORE_THAN_SIZE_LIMIT);
    let message = Message::new(original.clone()).with_topic_arn(TOPIC_ARN);

    let response = h.client.publish(&message).await.unwrap();
    assert_eq!(response, "message-1");

    assert_eq!(h.store.writes(), 1);
    let calls = h.transport.calls();
    assert_eq!(calls.len(), 1);

    let sent = &calls[0];
    assert_eq!(sent.topic_arn.as_deref(), Some(TOPIC_ARN));
    assert_eq!(
        sent.attributes,
        HashMap::from([(
            RESERVED_ATTRIBUTE_NAME.to_owned(),
            AttributeValue::number("262145")
        )])
    );

    let pointer = PayloadPointer::from_json(&sent.body).unwrap();
    assert_eq!(pointer.bucket_name, BUCKET);
    assert_eq!(h.store.inner.get(&pointer.key), Some(original));
}

#[tokio::test]
async fn offloaded_attributes_are_original_plus_size() {
    let h = harness(default_config());
    let message = Message::new(body(MORE_THAN_SIZE_LIMIT))
        .with_attribute("color", AttributeValue::string("blue"))
        .with_attribute("count", AttributeValue::number("7"));

    h.client.publish(&message).await.unwrap();

    let calls = h.transport.calls();
    let sent = &calls[0];
    let mut expected = message.attributes.clone();
    expected.insert(
        RESERVED_ATTRIBUTE_NAME.to_owned(),
        AttributeValue::number(string_size(&message.body).to_string()),
    );
    assert_eq!(sent.attributes, expected);
}

#[tokio::test]
async fn storage_key_attribute_selects_key() {
    let h = harness(default_config());
    let message = Message::new(body(MORE_THAN_SIZE_LIMIT))
        .with_attribute(STORAGE_KEY_ATTRIBUTE, AttributeValue::string("value"));

    h.client.publish(&message).await.unwrap();

    assert_eq!(h.store.keyed_writes.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.writes.load(Ordering::SeqCst), 0);

    let calls = h.transport.calls();
    let sent = &calls[0];
    assert_eq!(PayloadPointer::from_json(&sent.body).unwrap().key, "value");
    assert_eq!(
        sent.attributes[RESERVED_ATTRIBUTE_NAME].string_value.as_deref(),
        Some("262145")
    );
}

#[tokio::test]
async fn always_through_store_offloads_tiny_message() {
    let h = harness(default_config().with_always_through_store(true));
    h.client
        .publish(&Message::new(body(LESS_THAN_SIZE_LIMIT)))
        .await
        .unwrap();

    assert_eq!(h.store.writes(), 1);
    let calls = h.transport.calls();
    let sent = &calls[0];
    assert_eq!(
        sent.attributes[RESERVED_ATTRIBUTE_NAME].string_value.as_deref(),
        Some("3")
    );
}

#[tokio::test]
async fn custom_threshold_is_honoured() {
    let h = harness(default_config().with_payload_size_threshold(ARBITRARY_SMALLER_THRESHOLD));
    h.client
        .publish(&Message::new(body(ARBITRARY_SMALLER_THRESHOLD * 2)))
        .await
        .unwrap();

    assert_eq!(h.store.writes(), 1);
}

#[tokio::test]
async fn attributes_count_towards_offload_decision() {
    let h = harness(default_config().with_payload_size_threshold(60));
    // The 50-byte body fits, but "k" + "String" + "0123456789" pushes it over.
    let message = Message::new(body(50)).with_attribute("k", AttributeValue::string("0123456789"));

    h.client.publish(&message).await.unwrap();
    assert_eq!(h.store.writes(), 1);
}

#[tokio::test]
async fn caller_message_is_not_altered() {
    let h = harness(default_config());
    let message_body = body(MORE_THAN_SIZE_LIMIT);
    let attrs = HashMap::from([("SampleKey".to_owned(), AttributeValue::string("value"))]);
    let message = Message {
        body: message_body.clone(),
        attributes: attrs.clone(),
        topic_arn: Some(TOPIC_ARN.to_owned()),
        ..Message::default()
    };

    h.client.publish(&message).await.unwrap();

    assert_eq!(message.body, message_body);
    assert_eq!(message.attributes, attrs);
    assert_ne!(h.transport.calls()[0].body, message_body);
}

// -- Pass-through path --

#[tokio::test]
async fn message_at_threshold_is_not_offloaded() {
    let h = harness(default_config());
    let message = Message::new(body(DEFAULT_PAYLOAD_SIZE_THRESHOLD)).with_topic_arn(TOPIC_ARN);

    h.client.publish(&message).await.unwrap();

    assert_eq!(h.store.writes(), 0);
    assert_eq!(h.transport.calls(), vec![message]);
}

#[tokio::test]
async fn payload_support_disabled_leaves_large_message_to_transport() {
    let h = harness(OffloadConfig::new().with_payload_support_disabled());
    let message = Message::new(body(MORE_THAN_SIZE_LIMIT)).with_topic_arn(TOPIC_ARN);

    h.client.publish(&message).await.unwrap();

    assert_eq!(h.store.writes(), 0);
    assert_eq!(h.transport.calls(), vec![message]);
}

#[tokio::test]
async fn empty_body_is_delivered_unchanged() {
    let h = harness(default_config().with_always_through_store(true));
    let message = Message::new("").with_topic_arn(TOPIC_ARN);

    h.client.publish(&message).await.unwrap();

    assert_eq!(h.store.writes(), 0);
    assert_eq!(h.transport.calls(), vec![message]);
}

// -- Validation --

#[tokio::test]
async fn multi_protocol_message_cannot_be_offloaded() {
    let h = harness(default_config().with_always_through_store(true));
    let message = Message::new(r#"{"key1":"value1","key2":8.0}"#)
        .with_topic_arn(TOPIC_ARN)
        .with_structure("json");

    let err = h.client.publish(&message).await.unwrap_err();

    assert_eq!(err.as_offload_error(), Some(&OffloadError::UnsupportedStructure));
    assert!(
        err.to_string()
            .contains("does not support sending multi-protocol messages")
    );
    assert_eq!(h.store.writes(), 0);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn small_multi_protocol_message_is_rejected() {
    let h = harness(default_config());
    let message = Message::new(r#"{"key1":"value1","key2":8.0}"#)
        .with_topic_arn(TOPIC_ARN)
        .with_structure("json");

    let err = h.client.publish(&message).await.unwrap_err();

    assert_eq!(err.as_offload_error(), Some(&OffloadError::UnsupportedStructure));
    assert_eq!(h.store.writes(), 0);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn reserved_attribute_name_is_rejected() {
    let h = harness(default_config());
    let message = Message::new(body(MORE_THAN_SIZE_LIMIT))
        .with_attribute(RESERVED_ATTRIBUTE_NAME, AttributeValue::number("1"));

    let err = h.client.publish(&message).await.unwrap_err();

    assert!(matches!(
        err.as_offload_error(),
        Some(OffloadError::ReservedAttributeName(name)) if name == RESERVED_ATTRIBUTE_NAME
    ));
    assert_eq!(h.store.writes(), 0);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn too_many_attributes_are_rejected() {
    let h = harness(default_config());
    let attribute_count = MAX_ALLOWED_ATTRIBUTES + 1;
    let message = (0..attribute_count).fold(Message::new(body(MORE_THAN_SIZE_LIMIT)), |m, i| {
        m.with_attribute(format!("key{i}"), AttributeValue::string("value"))
    });

    let err = h.client.publish(&message).await.unwrap_err();

    assert!(
        err.to_string()
            .contains(&format!("number of message attributes [{attribute_count}]"))
    );
    assert_eq!(h.store.writes(), 0);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn oversized_attribute_key_is_rejected() {
    let h = harness(default_config());
    let key = body(MORE_THAN_SIZE_LIMIT);
    let value = body(LESS_THAN_SIZE_LIMIT);
    let message = Message::new(body(DEFAULT_PAYLOAD_SIZE_THRESHOLD)).with_attribute(
        key.clone(),
        AttributeValue {
            data_type: None,
            string_value: Some(value.clone()),
            binary_value: None,
        },
    );

    let err = h.client.publish(&message).await.unwrap_err();

    let expected_size = string_size(&key) + string_size(&value);
    assert!(err.to_string().contains(&format!(
        "total size of message attributes is {expected_size} bytes which is larger than the threshold of {DEFAULT_PAYLOAD_SIZE_THRESHOLD} bytes"
    )));
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn oversized_attribute_value_is_rejected() {
    let h = harness(default_config());
    let key = body(LESS_THAN_SIZE_LIMIT);
    let value = body(MORE_THAN_SIZE_LIMIT);
    let message = Message::new(body(DEFAULT_PAYLOAD_SIZE_THRESHOLD)).with_attribute(
        key.clone(),
        AttributeValue {
            data_type: None,
            string_value: Some(value.clone()),
            binary_value: None,
        },
    );

    let err = h.client.publish(&message).await.unwrap_err();

    assert_eq!(
        err.as_offload_error(),
        Some(&OffloadError::AttributeSizeExceeded {
            size: string_size(&key) + string_size(&value),
            threshold: DEFAULT_PAYLOAD_SIZE_THRESHOLD,
        })
    );
    assert_eq!(h.store.writes(), 0);
}

// -- Failures from collaborators --

#[tokio::test]
async fn store_failure_aborts_before_delivery() {
    let h = harness_with(
        default_config(),
        RecordingDeliverer::default(),
        CountingStore::failing(),
    );

    let err = h
        .client
        .publish(&Message::new(body(MORE_THAN_SIZE_LIMIT)))
        .await
        .unwrap_err();

    assert!(err.is_store_failure());
    assert!(matches!(
        err,
        PublishError::Transform(TransformError::Store(PayloadStoreError::Storage(_)))
    ));
    assert!(
        err.to_string()
            .starts_with("failed to store the message content in the payload store")
    );
    assert_eq!(h.store.writes(), 1);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn delivery_failure_is_returned_unchanged() {
    let h = harness_with(
        default_config(),
        RecordingDeliverer::failing("topic not found"),
        CountingStore::new(),
    );

    let err = h
        .client
        .publish(&Message::new(body(MORE_THAN_SIZE_LIMIT)))
        .await
        .unwrap_err();

    assert!(err.is_delivery_failure());
    assert_eq!(err.to_string(), "transport rejected publish: topic not found");
    // The stored payload is not rolled back.
    assert_eq!(h.store.inner.len(), 1);
    assert_eq!(h.transport.calls().len(), 1);
}

// -- Concurrency --

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishes_are_independent() {
    let h = harness(default_config());
    let client = Arc::new(h.client);

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let len = if i % 2 == 0 { MORE_THAN_SIZE_LIMIT } else { LESS_THAN_SIZE_LIMIT };
                let message = Message::new(body(len)).with_subject(format!("message-{i}"));
                client.publish(&message).await.map(|_| ())
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let calls = h.transport.calls();
    assert_eq!(calls.len(), 16);
    assert_eq!(h.store.writes(), 8);
    let offloaded = calls
        .iter()
        .filter(|m| m.attributes.contains_key(RESERVED_ATTRIBUTE_NAME))
        .count();
    assert_eq!(offloaded, 8);
}

// -- Cancellation --

#[tokio::test]
async fn dropping_publish_cancels_pending_store_and_delivery() {
    init_tracing();
    let transport = RecordingDeliverer::default();
    let store = Arc::new(StalledStore::default());
    let client = ExtendedClient::new(transport.clone(), store.clone(), default_config()).unwrap();
    let message = Message::new(body(MORE_THAN_SIZE_LIMIT)).with_topic_arn(TOPIC_ARN);

    let result = tokio::time::timeout(Duration::from_millis(50), client.publish(&message)).await;

    assert!(result.is_err(), "publish should still be waiting on the store");
    assert!(store.started.load(Ordering::SeqCst));

    // Nothing is left waiting to finish the write once the future is gone.
    store.release.notify_waiters();
    tokio::task::yield_now().await;

    assert_eq!(store.completed.load(Ordering::SeqCst), 0);
    assert!(transport.calls().is_empty());
}
