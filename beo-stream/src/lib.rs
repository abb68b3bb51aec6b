//! Beo notification streaming
//!
//! Typed notification model and topic-based fan-out for Bang & Olufsen
//! (Mozart platform) devices.
//!
//! # Architecture
//!
//! ```text
//! Link ──► NotificationRouter::route ──► DiagnosticSink (every notification, raw)
//!                  │
//!                  ├─ classify (kind / sub-type / button id)
//!                  ▼
//!          Topic subscribers (synchronous, in link-arrival order)
//! ```
//!
//! The link itself (transport, reconnects, JSON decoding) is not part of this
//! crate. It hands decoded [`Notification`] values to [`NotificationRouter::route`].
//!
//! # Usage
//!
//! ```rust
//! use beo_stream::{DeviceId, NotificationRouter, Payload, Topic};
//!
//! let router = NotificationRouter::new(DeviceId::new("12345678"));
//!
//! let subscription = router.subscribe(Topic::Volume, |payload| {
//!     if let Payload::Volume(volume) = payload {
//!         println!("volume changed: {:?}", volume);
//!     }
//! });
//!
//! // Later
//! subscription.unsubscribe();
//! ```

pub mod classify;
pub mod device_id;
pub mod diagnostic;
pub mod error;
pub mod key_event;
pub mod notification;
pub mod router;
pub mod topic;

// ============================================================================
// Re-exports
// ============================================================================

pub use classify::{classify, Routed};
pub use device_id::DeviceId;
pub use diagnostic::{BroadcastSink, DiagnosticEvent, DiagnosticSink, NoopSink, TracingSink};
pub use error::{Result, StreamError};
pub use key_event::KeyEvent;
pub use notification::{
    Art, BeolinkLeader, BeoRemoteButton, ButtonEvent, ListeningModeRef, Notification,
    NotificationTag, PlaybackContentMetadata, PlaybackError, PlaybackProgress, RenderingState,
    SoftwareUpdateState, Source, VolumeLevel, VolumeMute, VolumeState,
};
pub use router::{Handler, NotificationRouter, Subscription};
pub use topic::{Payload, Topic};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::device_id::DeviceId;
    pub use crate::diagnostic::DiagnosticSink;
    pub use crate::key_event::KeyEvent;
    pub use crate::notification::Notification;
    pub use crate::router::{NotificationRouter, Subscription};
    pub use crate::topic::{Payload, Topic};
}
