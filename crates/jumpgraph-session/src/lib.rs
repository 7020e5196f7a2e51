#![doc = include_str!("../README.md")]

pub mod bridge;
pub mod debounce;
pub mod document;
pub mod error;
pub mod host;
pub mod protocol;
pub mod router;
pub mod runtime;
#[cfg(feature = "watcher")]
pub mod watcher;

#[cfg(test)]
mod testing;

pub use bridge::{Reconciled, SyncBridge, SyncConfig};
pub use debounce::Debouncer;
pub use document::{Document, FileDocument, MemoryDocument};
pub use error::{Result, SessionError};
pub use host::{FocusedLocation, Host, NavigationRequest, Selection, ViewColumn};
pub use protocol::{FromPresentation, ToPresentation};
pub use router::{CommandRouter, SessionId};
pub use runtime::{Command, Event, run};
#[cfg(feature = "watcher")]
pub use watcher::{DocumentWatcher, WatcherConfig, WatcherHandle};
