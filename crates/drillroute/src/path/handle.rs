use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{NodeId, QueryError};

use super::{NamedNode, PathFinder, PathPose};

/// Caller-owned slot for the currently loaded graph.
///
/// Loading takes the write lock; queries clone the `Arc` under the read lock
/// and run without holding it.
#[derive(Debug, Default)]
pub struct GraphHandle {
    slot: RwLock<Option<Arc<PathFinder>>>,
}

impl GraphHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `finder`, returning the previously loaded graph.
    pub fn replace(&self, finder: PathFinder) -> Option<Arc<PathFinder>> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(Arc::new(finder))
    }

    pub fn load(&self, finder: PathFinder) {
        self.replace(finder);
    }

    pub fn unload(&self) -> Option<Arc<PathFinder>> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Snapshot of the loaded graph.
    pub fn current(&self) -> Result<Arc<PathFinder>, QueryError> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(QueryError::NotLoaded)
    }

    pub fn find_path(
        &self,
        start: NodeId,
        goal: NodeId,
    ) -> Result<Option<Vec<PathPose>>, QueryError> {
        self.current()?.find_path(start, goal)
    }

    pub fn list_named_nodes(&self) -> Result<Vec<NamedNode>, QueryError> {
        Ok(self.current()?.list_named_nodes())
    }
}
