//! Shared, swappable handle to a fitted forest.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::RfError;
use crate::forest::RandomForest;

/// A thread-safe slot holding the model currently used for inference.
///
/// Readers take an `Arc` snapshot with [`ModelHandle::current`] and keep
/// using it even if the slot is swapped meanwhile. Only fitted forests are
/// ever installed.
#[derive(Debug)]
pub struct ModelHandle {
    model: RwLock<Arc<RandomForest>>,
}

fn ensure_fitted(forest: &RandomForest) -> Result<(), RfError> {
    if forest.is_fitted() {
        Ok(())
    } else {
        Err(RfError::NotFitted)
    }
}

impl ModelHandle {
    /// Wrap an already fitted forest.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::NotFitted`] if `forest` has no trees.
    pub fn new(forest: RandomForest) -> Result<Self, RfError> {
        ensure_fitted(&forest)?;
        Ok(Self {
            model: RwLock::new(Arc::new(forest)),
        })
    }

    /// Load the model artifact at `path`.
    ///
    /// # Errors
    ///
    /// Any error from [`RandomForest::load`], or [`RfError::NotFitted`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        Self::new(RandomForest::load(path)?)
    }

    /// Return a snapshot of the installed model.
    #[must_use]
    pub fn current(&self) -> Arc<RandomForest> {
        Arc::clone(&*self.model.read())
    }

    /// Install `forest` and return the model it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::NotFitted`] if `forest` has no trees; the installed
    /// model is left in place.
    pub fn swap(&self, forest: RandomForest) -> Result<Arc<RandomForest>, RfError> {
        ensure_fitted(&forest)?;
        let n_trees = forest.n_trees();
        let previous = std::mem::replace(&mut *self.model.write(), Arc::new(forest));
        info!(n_trees, "model swapped");
        Ok(previous)
    }

    /// Load `path` and install it, returning the model it replaces.
    ///
    /// # Errors
    ///
    /// Any error from [`RandomForest::load`], or [`RfError::NotFitted`].
    /// On error the installed model is left in place.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<Arc<RandomForest>, RfError> {
        let forest = RandomForest::load(path)?;
        self.swap(forest)
    }

    /// Predict with the installed model.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::predict`].
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        self.current().predict(features)
    }
}
