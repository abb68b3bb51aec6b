//! Beo device state
//!
//! Reconciles the notification stream of one Bang & Olufsen device into a
//! single, internally consistent [`DeviceState`].
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use beo_state::{KnownSources, StateReconciler};
//! use beo_stream::{DeviceId, Notification, NotificationRouter, RenderingState};
//!
//! let device_id = DeviceId::new("30020041");
//! let router = NotificationRouter::new(device_id.clone());
//! let reconciler = Arc::new(StateReconciler::new(device_id, KnownSources::default(), 16));
//! let _subscriptions = reconciler.attach(&router);
//!
//! router.route(&Notification::PlaybackState(RenderingState::new("started")));
//! assert!(reconciler.snapshot().playback_state.is_playing());
//! ```

pub mod device_state;
pub mod error;
pub mod logging;
pub mod model;
pub mod reconciler;

// ============================================================================
// Re-exports
// ============================================================================

pub use device_state::{DeviceState, MediaType};
pub use error::{Result, StateError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use model::{
    KnownSource, KnownSources, ListeningMode, Metadata, PlaybackState, Progress, SourceRef, Volume,
};
pub use reconciler::{StateReconciler, DEFAULT_ERROR_CAPACITY, RECONCILED_TOPICS};
