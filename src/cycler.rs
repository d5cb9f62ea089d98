//! The refresh tick: enumerate, pick, relink.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::store::PhotoStore;
use crate::Error;

/// Result of a tick that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The managed link now points at this photo
    Published(PathBuf),
    /// No eligible photos; the link was left as it was
    NoPhotos,
}

/// Picks a random eligible photo and republishes it.
pub struct ImageCycler {
    store: Arc<dyn PhotoStore>,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for ImageCycler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCycler").finish_non_exhaustive()
    }
}

impl ImageCycler {
    /// Create a cycler with an OS-seeded random source.
    pub fn new(store: Arc<dyn PhotoStore>) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    /// Create a cycler with an explicit random source.
    pub fn with_rng(store: Arc<dyn PhotoStore>, rng: StdRng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tick`] if listing the photos or swapping the link
    /// fails. An empty photo set is not an error.
    pub fn cycle(&self) -> Result<CycleOutcome, Error> {
        let photos = self.store.list_photos()?;

        let choice = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            photos.choose(&mut *rng).cloned()
        };
        let Some(image) = choice else {
            tracing::debug!("no eligible photos; keeping current image");
            return Ok(CycleOutcome::NoPhotos);
        };

        self.store.replace_link(&image)?;
        tracing::debug!(path = %image.display(), candidates = photos.len(), "published image");
        Ok(CycleOutcome::Published(image))
    }
}
