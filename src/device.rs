//! The photo cycler device model.
//!
//! Holds the two Web Thing properties and owns the refresh scheduler:
//!
//! | Property | Access | Value |
//! |----------|--------|-------|
//! | `updateRate` | read-write | refresh interval in seconds |
//! | `image` | read-only | always `null`; the picture is at `/static/current.jpg` |
//!
//! Writing `updateRate` restarts the timer at the new period. Each timer
//! tick picks a random photo and relinks `current.jpg` to it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::cycler::{CycleOutcome, ImageCycler};
use crate::scheduler::{RefreshScheduler, SchedulerState};
use crate::store::FsStore;
use crate::thing::{ImageDescriptor, IMAGE_PROPERTY, UPDATE_RATE_PROPERTY};
use crate::{Config, Error};

/// The photo cycler device.
///
/// Dropping it stops the refresh timer.
#[derive(Debug)]
pub struct PhotoCycler {
    update_rate: Mutex<f64>,
    last_image: Arc<RwLock<Option<PathBuf>>>,
    scheduler: RefreshScheduler,
}

impl PhotoCycler {
    /// Validate the configured directories and start cycling.
    ///
    /// The first photo is published one full `update_rate` after this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either directory is unusable;
    /// nothing is started in that case.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn initialize(config: &Config) -> Result<Self, Error> {
        let config = config.validate()?;
        tracing::info!(
            photos = %config.photos_path.display(),
            static_dir = %config.static_path.display(),
            update_rate = config.update_rate,
            "starting photo cycler"
        );

        let store = Arc::new(FsStore::new(&config.photos_path, &config.static_path));
        Self::with_cycler(ImageCycler::new(store), config.update_rate)
    }

    /// Start cycling with a caller-supplied cycler.
    ///
    /// Useful for custom [`PhotoStore`](crate::PhotoStore) implementations or
    /// a seeded random source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPropertyValue`] if `update_rate` is negative.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime. Later property writes
    /// may come from any thread.
    pub fn with_cycler(cycler: ImageCycler, update_rate: f64) -> Result<Self, Error> {
        validate_update_rate(update_rate)?;

        let last_image = Arc::new(RwLock::new(None));
        let published = last_image.clone();
        let scheduler = RefreshScheduler::new(move || match cycler.cycle() {
            Ok(CycleOutcome::Published(path)) => {
                *published.write().unwrap_or_else(|e| e.into_inner()) = Some(path);
            }
            Ok(CycleOutcome::NoPhotos) => {}
            Err(e) => tracing::warn!("{}", e),
        });
        scheduler.start(timer_period(update_rate));

        Ok(Self {
            update_rate: Mutex::new(update_rate),
            last_image,
            scheduler,
        })
    }

    /// Current refresh interval in seconds.
    pub fn update_rate(&self) -> f64 {
        *self.update_rate.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the refresh interval and restart the timer.
    ///
    /// A value of 0 is stored as 0 but the timer fires at most once per
    /// second.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPropertyValue`] for negative or non-finite
    /// values; the stored interval and running timer are left unchanged.
    pub fn set_update_rate(&self, seconds: f64) -> Result<(), Error> {
        validate_update_rate(seconds)?;

        // Held across stop/start so concurrent writers cannot both arm a timer
        let mut rate = self.update_rate.lock().unwrap_or_else(|e| e.into_inner());
        self.scheduler.stop();
        *rate = seconds;
        self.scheduler.start(timer_period(seconds));

        tracing::info!(update_rate = seconds, "update rate changed");
        Ok(())
    }

    /// How clients reach the current image.
    pub fn current_image(&self) -> ImageDescriptor {
        ImageDescriptor::default()
    }

    /// The photo most recently published by a tick, if any.
    pub fn last_image(&self) -> Option<PathBuf> {
        self.last_image
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// State of the refresh timer.
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Read a property value by name.
    pub fn property(&self, name: &str) -> Result<Value, Error> {
        match name {
            UPDATE_RATE_PROPERTY => Ok(rate_value(self.update_rate())),
            IMAGE_PROPERTY => Ok(Value::Null),
            _ => Err(Error::UnknownProperty(name.to_string())),
        }
    }

    /// All property values keyed by name.
    pub fn properties(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert(
            UPDATE_RATE_PROPERTY.to_string(),
            rate_value(self.update_rate()),
        );
        values.insert(IMAGE_PROPERTY.to_string(), Value::Null);
        values
    }

    /// Write a property value by name and return the stored value.
    pub fn set_property(&self, name: &str, value: &Value) -> Result<Value, Error> {
        match name {
            UPDATE_RATE_PROPERTY => {
                let seconds = value
                    .as_f64()
                    .ok_or_else(|| Error::invalid_value(name, "expected a number"))?;
                self.set_update_rate(seconds)?;
                Ok(rate_value(seconds))
            }
            IMAGE_PROPERTY => Err(Error::ReadOnlyProperty(name.to_string())),
            _ => Err(Error::UnknownProperty(name.to_string())),
        }
    }

    /// Stop the refresh timer.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        tracing::info!("photo cycler stopped");
    }
}

fn validate_update_rate(seconds: f64) -> Result<(), Error> {
    if !seconds.is_finite() {
        return Err(Error::invalid_value(
            UPDATE_RATE_PROPERTY,
            "must be a finite number",
        ));
    }
    if seconds < 0.0 {
        return Err(Error::invalid_value(
            UPDATE_RATE_PROPERTY,
            format!("must not be negative, got {}", seconds),
        ));
    }
    Ok(())
}

fn timer_period(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// Whole seconds serialize as integers, like the value the client wrote.
fn rate_value(seconds: f64) -> Value {
    if seconds.fract() == 0.0 && seconds <= u32::MAX as f64 {
        Value::from(seconds as u64)
    } else {
        Value::from(seconds)
    }
}
