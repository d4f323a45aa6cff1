//! Deferred collaborator reads tagged with the mounting that asked for them.

use std::collections::{BTreeMap, VecDeque};

use serde_json::Value;

use crate::error::Result;
use crate::platform::{ChannelEvent, Collaborators, DriveFile, StoredObject, SubscriptionHandle};
use crate::shell::ActivationToken;

/// A read an applet wants performed against the collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchJob {
    /// Every entry of a key-value collection.
    Collection(String),
    /// Every object in a storage bucket.
    Objects(String),
    /// Every record on a channel topic.
    ChannelHistory(String),
    /// Events queued on a subscription.
    ChannelPoll(SubscriptionHandle),
    /// Files visible to the session owning `access_token`.
    DriveFiles { access_token: String },
}

/// Outcome of one [`FetchJob`].
#[derive(Debug)]
pub enum FetchResult {
    Collection {
        name: String,
        entries: Result<BTreeMap<String, String>>,
    },
    Objects {
        bucket: String,
        objects: Result<Vec<StoredObject>>,
    },
    ChannelHistory {
        topic: String,
        records: Result<Vec<Value>>,
    },
    ChannelEvents(Result<Vec<ChannelEvent>>),
    DriveFiles(Result<Vec<DriveFile>>),
}

impl FetchJob {
    /// Perform the read.
    pub fn run(self, services: &mut Collaborators) -> FetchResult {
        match self {
            Self::Collection(name) => {
                let entries = services.kv.get_all(&name);
                FetchResult::Collection { name, entries }
            },
            Self::Objects(bucket) => {
                let objects = services.objects.list(&bucket);
                FetchResult::Objects { bucket, objects }
            },
            Self::ChannelHistory(topic) => {
                let records = services.channel.history(&topic);
                FetchResult::ChannelHistory { topic, records }
            },
            Self::ChannelPoll(handle) => FetchResult::ChannelEvents(services.channel.poll(handle)),
            Self::DriveFiles { access_token } => {
                FetchResult::DriveFiles(services.drive.list(&access_token))
            },
        }
    }
}

/// FIFO of pending reads.
#[derive(Debug, Default)]
pub struct FetchQueue {
    jobs: VecDeque<(ActivationToken, FetchJob)>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: ActivationToken, job: FetchJob) {
        self.jobs.push_back((token, job));
    }

    pub fn pop(&mut self) -> Option<(ActivationToken, FetchJob)> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
