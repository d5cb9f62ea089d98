//! # photo-cycler
//!
//! A [Web Thing](https://webthings.io/api/) that shows a random photo from a
//! directory and changes it on a timer.
//!
//! Every `updateRate` seconds the device lists the JPEG files in the photos
//! directory, picks one at random, and points `current.jpg` in the static
//! directory at it. The static directory is served under `/static/`, so the
//! current picture is always at `/static/current.jpg`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use photo_cycler::{Config, PhotoCycler};
//!
//! let config = Config::new("/srv/photos", "/srv/photo-cycler/static");
//! let device = PhotoCycler::initialize(&config)?;
//!
//! // Cycle every 30 seconds instead of the default 5
//! device.set_update_rate(30.0)?;
//! ```
//!
//! ## Properties
//!
//! | Property | Type | Access | Notes |
//! |----------|------|--------|-------|
//! | `updateRate` | number, seconds, minimum 0 | read-write | restarts the timer |
//! | `image` | null | read-only | alternate link to `/static/current.jpg` |
//!
//! An `updateRate` of 0 is accepted, but the timer never fires more than
//! once per second.
//!
//! ## Feature Flags
//!
//! - `axum` (default) - Web Thing REST endpoints and static file serving
//! - `full` - All features

mod config;
mod cycler;
mod device;
mod error;
mod scheduler;
mod store;
pub mod thing;

use std::time::Duration;

pub use config::Config;
pub use cycler::{CycleOutcome, ImageCycler};
pub use device::PhotoCycler;
pub use error::Error;
pub use scheduler::{RefreshScheduler, SchedulerState};
pub use store::{is_jpeg, FsStore, PhotoStore};
pub use thing::ImageDescriptor;

/// Name of the managed link inside the static directory
pub const CURRENT_IMAGE_NAME: &str = "current.jpg";

/// URL path of the current image
pub const CURRENT_IMAGE_HREF: &str = "/static/current.jpg";

/// Media type of every published image
pub const IMAGE_MEDIA_TYPE: &str = "image/jpeg";

/// URL path of the bundled web UI
pub const UI_HREF: &str = "/static/index.html";

/// Refresh interval in seconds until a client changes it
pub const DEFAULT_UPDATE_RATE: f64 = 5.0;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8888;

/// Shortest timer period; smaller update rates fire at this period
pub const MIN_TIMER_PERIOD: Duration = Duration::from_secs(1);

/// Longest timer period (one year)
pub const MAX_TIMER_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// Re-export axum integration
#[cfg(feature = "axum")]
pub mod axum_ext;
