//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::BookmarkService;
use crate::config::Settings;
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::store::TreeStore;
use crate::infrastructure::traits::{LocationProvider, NodeRepository, Notifier};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Node storage
    pub repo: Arc<dyn NodeRepository>,

    pub bookmarks: BookmarkService,
}

impl ServiceContainer {
    /// Create a container backed by the file store at `settings.store_path`.
    pub fn new(
        settings: Settings,
        locations: Arc<dyn LocationProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> InfraResult<Self> {
        let store = TreeStore::open(&settings.store_path)?
            .with_default_list_name(settings.default_list_name.clone());
        Ok(Self::with_deps(settings, Arc::new(store), locations, notifier))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        repo: Arc<dyn NodeRepository>,
        locations: Arc<dyn LocationProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let settings = Arc::new(settings);
        let bookmarks = BookmarkService::new(repo.clone(), locations, notifier, settings.clone());

        Self {
            settings,
            repo,
            bookmarks,
        }
    }
}
