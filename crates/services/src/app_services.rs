use std::sync::Arc;

use quiz_core::QuizCatalog;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::{QuizSessionController, SessionConfig};

/// Assembles host-facing services over a chosen storage backend.
#[derive(Clone)]
pub struct QuizServices {
    controller: Arc<QuizSessionController>,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: QuizCatalog,
        config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, catalog, config))
    }

    /// Build services over a volatile in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: QuizCatalog, config: SessionConfig) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, catalog, config)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        catalog: QuizCatalog,
        config: SessionConfig,
    ) -> Self {
        let controller = QuizSessionController::new(
            clock,
            Arc::new(catalog),
            Arc::clone(&storage.scores),
        )
        .with_config(config);
        Self {
            controller: Arc::new(controller),
        }
    }

    #[must_use]
    pub fn controller(&self) -> Arc<QuizSessionController> {
        Arc::clone(&self.controller)
    }
}
