//! Interfaces to the hosted backends the applets consume.
//!
//! Each backend is opaque: the shell only sees request/response calls and
//! polled event queues. Implementations live outside this crate, apart from
//! the in-memory ones in [`crate::memory`].

use std::collections::BTreeMap;

use handset_types::error::Result;
use serde::{Deserialize, Serialize};

use crate::memory::{
    MemoryChannel, MemoryDrive, MemoryFormRelay, MemoryIdentity, MemoryKvStore,
    MemoryObjectStorage,
};

/// Hash-of-strings store (contacts, calendar events, notes).
pub trait KeyValueStore {
    fn get_all(&self, collection: &str) -> Result<BTreeMap<String, String>>;

    fn set(&mut self, collection: &str, key: &str, value: &str) -> Result<()>;

    fn delete(&mut self, collection: &str, key: &str) -> Result<()>;
}

/// An object in a storage bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub name: String,
    pub url: String,
    /// Unix seconds of the last write.
    pub updated_at: u64,
}

/// Bucketed blob storage for photos.
pub trait ObjectStorage {
    /// Store `bytes` under `name`, returning the public URL.
    fn upload(&mut self, bucket: &str, name: &str, bytes: &[u8]) -> Result<String>;

    fn list(&self, bucket: &str) -> Result<Vec<StoredObject>>;
}

/// Opaque handle for one channel subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub u64);

/// A change pushed by the realtime channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Insert(serde_json::Value),
    Update(serde_json::Value),
}

/// Realtime table-change channel. Records are JSON objects keyed by an
/// integer `id`; publishing a record without an `id` inserts it, publishing
/// one whose `id` exists updates it.
pub trait MessageChannel {
    /// Every record currently on `topic`, oldest first.
    fn history(&self, topic: &str) -> Result<Vec<serde_json::Value>>;

    fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle>;

    /// Drain the events queued for `handle` since the last poll.
    fn poll(&mut self, handle: SubscriptionHandle) -> Result<Vec<ChannelEvent>>;

    fn unsubscribe(&mut self, handle: SubscriptionHandle);

    fn publish(&mut self, topic: &str, record: serde_json::Value) -> Result<()>;
}

/// An authenticated identity-provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: String,
}

/// OAuth-style identity provider.
pub trait IdentityProvider {
    fn sign_in(&mut self, provider: &str) -> Result<Session>;

    fn sign_out(&mut self);

    fn current_session(&self) -> Option<Session>;
}

/// Body of one cloud-drive upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub access_token: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A file in the cloud drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Upload/listing proxy in front of the cloud drive.
pub trait DriveUploader {
    /// Upload a file, returning the drive's file id.
    fn upload(&mut self, request: UploadRequest) -> Result<String>;

    fn list(&self, access_token: &str) -> Result<Vec<DriveFile>>;
}

/// Hosted form endpoint used to deliver email.
pub trait FormRelay {
    fn submit(&mut self, fields: &BTreeMap<String, String>) -> Result<()>;
}

/// Every hosted backend, boxed so frontends can mix implementations.
pub struct Collaborators {
    pub kv: Box<dyn KeyValueStore>,
    pub objects: Box<dyn ObjectStorage>,
    pub channel: Box<dyn MessageChannel>,
    pub identity: Box<dyn IdentityProvider>,
    pub drive: Box<dyn DriveUploader>,
    pub forms: Box<dyn FormRelay>,
}

impl Collaborators {
    /// All-in-memory backends, empty.
    pub fn in_memory() -> Self {
        Self {
            kv: Box::new(MemoryKvStore::new()),
            objects: Box::new(MemoryObjectStorage::new("mem://photos")),
            channel: Box::new(MemoryChannel::new()),
            identity: Box::new(MemoryIdentity::new()),
            drive: Box::new(MemoryDrive::new()),
            forms: Box::new(MemoryFormRelay::new()),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::in_memory()
    }
}
