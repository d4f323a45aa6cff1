//! In-memory implementations of the storage and collaborator traits.
//!
//! Used by unit tests and the desktop demo. Each backend can be switched
//! offline, after which every call fails with [`HandsetError::Service`]
//! (or [`HandsetError::Storage`] for local storage).

use std::collections::{BTreeMap, VecDeque};

use handset_types::error::{HandsetError, Result};

use crate::collaborators::{
    ChannelEvent, DriveFile, DriveUploader, FormRelay, IdentityProvider, KeyValueStore,
    MessageChannel, ObjectStorage, Session, StoredObject, SubscriptionHandle, UploadRequest,
};
use crate::services::SettingsStorage;

fn offline_error(what: &str) -> HandsetError {
    HandsetError::Service(format!("{what} is unreachable"))
}

// ---------------------------------------------------------------------------
// Local settings storage
// ---------------------------------------------------------------------------

/// Settings storage held in a map. `read_only` simulates a full or
/// disabled browser storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every write.
    pub fn read_only() -> Self {
        Self {
            entries: BTreeMap::new(),
            read_only: true,
        }
    }

    /// Storage pre-seeded with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries,
            read_only: false,
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl SettingsStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(HandsetError::Storage(format!("quota exceeded writing {key}")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Key-value store
// ---------------------------------------------------------------------------

/// Collections of string hashes.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    collections: BTreeMap<String, BTreeMap<String, String>>,
    offline: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get_all(&self, collection: &str) -> Result<BTreeMap<String, String>> {
        if self.offline {
            return Err(offline_error("key-value store"));
        }
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn set(&mut self, collection: &str, key: &str, value: &str) -> Result<()> {
        if self.offline {
            return Err(offline_error("key-value store"));
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, collection: &str, key: &str) -> Result<()> {
        if self.offline {
            return Err(offline_error("key-value store"));
        }
        if let Some(c) = self.collections.get_mut(collection) {
            c.remove(key);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// Buckets of blobs. URLs are `<base>/<bucket>/<name>`; timestamps come from
/// a logical clock so listings are ordered deterministically.
#[derive(Debug)]
pub struct MemoryObjectStorage {
    base_url: String,
    buckets: BTreeMap<String, BTreeMap<String, (Vec<u8>, u64)>>,
    clock: u64,
    offline: bool,
}

impl MemoryObjectStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            buckets: BTreeMap::new(),
            clock: 0,
            offline: false,
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Stored bytes of one object.
    pub fn bytes(&self, bucket: &str, name: &str) -> Option<&[u8]> {
        self.buckets
            .get(bucket)
            .and_then(|b| b.get(name))
            .map(|(data, _)| data.as_slice())
    }
}

impl ObjectStorage for MemoryObjectStorage {
    fn upload(&mut self, bucket: &str, name: &str, bytes: &[u8]) -> Result<String> {
        if self.offline {
            return Err(offline_error("object storage"));
        }
        if name.is_empty() {
            return Err(HandsetError::Service("object name is empty".into()));
        }
        self.clock += 1;
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(name.to_string(), (bytes.to_vec(), self.clock));
        Ok(format!("{}/{bucket}/{name}", self.base_url))
    }

    fn list(&self, bucket: &str) -> Result<Vec<StoredObject>> {
        if self.offline {
            return Err(offline_error("object storage"));
        }
        Ok(self
            .buckets
            .get(bucket)
            .map(|b| {
                b.iter()
                    .map(|(name, (_, updated_at))| StoredObject {
                        name: name.clone(),
                        url: format!("{}/{bucket}/{name}", self.base_url),
                        updated_at: *updated_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Realtime channel
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Subscription {
    topic: String,
    queue: VecDeque<ChannelEvent>,
}

/// Topic tables with change fan-out to subscribers. Publishers receive
/// their own changes, as the hosted channel does.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    topics: BTreeMap<String, Vec<serde_json::Value>>,
    subscriptions: BTreeMap<SubscriptionHandle, Subscription>,
    next_handle: u64,
    next_id: u64,
    offline: bool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn fan_out(&mut self, topic: &str, event: ChannelEvent) {
        for sub in self.subscriptions.values_mut() {
            if sub.topic == topic {
                sub.queue.push_back(event.clone());
            }
        }
    }
}

impl MessageChannel for MemoryChannel {
    fn history(&self, topic: &str) -> Result<Vec<serde_json::Value>> {
        if self.offline {
            return Err(offline_error("message channel"));
        }
        Ok(self.topics.get(topic).cloned().unwrap_or_default())
    }

    fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle> {
        if self.offline {
            return Err(offline_error("message channel"));
        }
        self.next_handle += 1;
        let handle = SubscriptionHandle(self.next_handle);
        self.subscriptions.insert(
            handle,
            Subscription {
                topic: topic.to_string(),
                queue: VecDeque::new(),
            },
        );
        Ok(handle)
    }

    fn poll(&mut self, handle: SubscriptionHandle) -> Result<Vec<ChannelEvent>> {
        match self.subscriptions.get_mut(&handle) {
            Some(sub) => Ok(sub.queue.drain(..).collect()),
            None => Err(HandsetError::Service(format!(
                "no subscription {}",
                handle.0
            ))),
        }
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.subscriptions.remove(&handle);
    }

    fn publish(&mut self, topic: &str, record: serde_json::Value) -> Result<()> {
        if self.offline {
            return Err(offline_error("message channel"));
        }
        let serde_json::Value::Object(mut fields) = record else {
            return Err(HandsetError::Service("record must be a JSON object".into()));
        };
        let rows = self.topics.entry(topic.to_string()).or_default();
        let id = fields.get("id").and_then(serde_json::Value::as_u64);
        let existing = id.and_then(|id| {
            rows.iter()
                .position(|r| r.get("id").and_then(serde_json::Value::as_u64) == Some(id))
        });
        let event = match existing {
            Some(pos) => {
                let record = serde_json::Value::Object(fields);
                rows[pos] = record.clone();
                ChannelEvent::Update(record)
            },
            None => {
                let id = match id {
                    Some(id) => id,
                    None => {
                        self.next_id += 1;
                        self.next_id
                    },
                };
                self.next_id = self.next_id.max(id);
                fields.insert("id".into(), id.into());
                let record = serde_json::Value::Object(fields);
                rows.push(record.clone());
                ChannelEvent::Insert(record)
            },
        };
        self.fan_out(topic, event);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Identity provider
// ---------------------------------------------------------------------------

/// Identity provider that signs anyone in.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    session: Option<Session>,
    issued: u64,
    offline: bool,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl IdentityProvider for MemoryIdentity {
    fn sign_in(&mut self, provider: &str) -> Result<Session> {
        if self.offline {
            return Err(offline_error("identity provider"));
        }
        self.issued += 1;
        let session = Session {
            access_token: format!("{provider}-token-{}", self.issued),
            user: format!("demo@{provider}"),
        };
        self.session = Some(session.clone());
        Ok(session)
    }

    fn sign_out(&mut self) {
        self.session = None;
    }

    fn current_session(&self) -> Option<Session> {
        self.session.clone()
    }
}

// ---------------------------------------------------------------------------
// Drive proxy
// ---------------------------------------------------------------------------

/// Drive proxy keeping files in upload order.
#[derive(Debug, Default)]
pub struct MemoryDrive {
    files: Vec<DriveFile>,
    offline: bool,
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl DriveUploader for MemoryDrive {
    fn upload(&mut self, request: UploadRequest) -> Result<String> {
        if self.offline {
            return Err(offline_error("drive proxy"));
        }
        if request.access_token.is_empty() {
            return Err(HandsetError::Service("unauthorized".into()));
        }
        let id = format!("file-{}", self.files.len() + 1);
        self.files.push(DriveFile {
            id: id.clone(),
            name: request.file_name,
            mime_type: request.mime_type,
        });
        Ok(id)
    }

    fn list(&self, access_token: &str) -> Result<Vec<DriveFile>> {
        if self.offline {
            return Err(offline_error("drive proxy"));
        }
        if access_token.is_empty() {
            return Err(HandsetError::Service("unauthorized".into()));
        }
        Ok(self.files.clone())
    }
}

// ---------------------------------------------------------------------------
// Form relay
// ---------------------------------------------------------------------------

/// Form relay that records every submission.
#[derive(Debug, Default)]
pub struct MemoryFormRelay {
    submissions: Vec<BTreeMap<String, String>>,
    offline: bool,
}

impl MemoryFormRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn submissions(&self) -> &[BTreeMap<String, String>] {
        &self.submissions
    }
}

impl FormRelay for MemoryFormRelay {
    fn submit(&mut self, fields: &BTreeMap<String, String>) -> Result<()> {
        if self.offline {
            return Err(offline_error("form relay"));
        }
        self.submissions.push(fields.clone());
        Ok(())
    }
}
