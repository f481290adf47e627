use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSnapshot {
    pub version: u64,
    pub model: String,
}

/// The currently selected model. Calls capture a snapshot once at start, so
/// a switch only affects calls issued after it.
#[derive(Debug)]
pub struct ModelSelection {
    current: RwLock<Arc<ModelSnapshot>>,
}

impl ModelSelection {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(Arc::new(ModelSnapshot {
                version: 0,
                model: model.into(),
            })),
        }
    }

    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        self.current.read().clone()
    }

    /// Replace the selected model and return the new version.
    pub fn select(&self, model: impl Into<String>) -> u64 {
        let mut current = self.current.write();
        let version = current.version + 1;
        *current = Arc::new(ModelSnapshot {
            version,
            model: model.into(),
        });
        version
    }
}
