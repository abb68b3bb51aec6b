//! Beo event manager
//!
//! Session layer for Bang & Olufsen devices: connection supervision, the link
//! worker, source list assembly and the software update boundary, wired
//! around the router from `beo-stream` and the reconciler from `beo-state`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use beo_event_manager::{DeviceSession, LinkEvent, SessionConfig};
//! use beo_stream::{Payload, Topic};
//!
//! # async fn example(link: impl futures::Stream<Item = LinkEvent> + Send + 'static)
//! #     -> beo_event_manager::Result<()> {
//! let session = DeviceSession::new(SessionConfig::new("30020041"))?;
//!
//! session.subscribe(Topic::ConnectionStatus, |payload| {
//!     if let Payload::ConnectionStatus { connected, .. } = payload {
//!         println!("connected: {}", connected);
//!     }
//! });
//!
//! let worker = session.spawn_link(link);
//! let stats = worker.join().await?;
//! println!("{} notifications", stats.notifications);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod software_update;
pub mod sources;
pub mod supervisor;
pub mod worker;

pub use config::{DiagnosticMode, SessionConfig, SourceListOptions, DEFAULT_API_VERSION};
pub use error::{ApiError, EventManagerError, Result};
pub use session::DeviceSession;
pub use software_update::{DeviceRegistry, SoftwareUpdateWatcher, SoftwareVersionSource};
pub use sources::{
    assemble_source_list, AudioSource, MenuContent, MenuItem, SourceApi, SourceEntry, SourceKind,
    SourceList, SourceListWatcher,
};
pub use supervisor::{ConnectionState, ConnectionSupervisor};
pub use worker::{run_link_loop, LinkEvent, LinkStats, LinkWorker};
