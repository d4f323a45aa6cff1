//! Platform services and hosted-collaborator interfaces.
//!
//! The shell talks to the device (clock, battery, camera permission, local
//! storage) through the traits in [`services`], and to hosted backends
//! (key-value store, object storage, realtime channel, identity, drive
//! proxy, form relay) through the traits in [`collaborators`]. In-memory
//! implementations back the tests and the desktop demo.

pub mod collaborators;
pub mod file_storage;
pub mod memory;
pub mod services;

pub use collaborators::{
    ChannelEvent, Collaborators, DriveFile, DriveUploader, FormRelay, IdentityProvider,
    KeyValueStore, MessageChannel, ObjectStorage, Session, StoredObject, SubscriptionHandle,
    UploadRequest,
};
pub use file_storage::FileStorage;
pub use memory::{
    MemoryChannel, MemoryDrive, MemoryFormRelay, MemoryIdentity, MemoryKvStore,
    MemoryObjectStorage, MemoryStorage,
};
pub use services::{
    BatteryState, DesktopPlatform, MediaService, Platform, PowerInfo, PowerService,
    SettingsStorage, SystemTime, TimeService,
};

#[cfg(test)]
mod tests;
