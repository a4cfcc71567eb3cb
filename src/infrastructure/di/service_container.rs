//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{BuildService, InitService, ServeService};
use crate::config::Settings;
use crate::domain::TemplateSet;
use crate::infrastructure::traits::{
    CommandRunner, ConfirmationPrompt, FileSystem, RealCommandRunner, RealFileSystem,
};

/// Container holding the shared dependencies of all services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, cmd }
    }

    /// Initializer for `templates`, asking `prompt` about existing files.
    pub fn init_service(
        &self,
        templates: TemplateSet,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> InitService {
        InitService::new(Arc::clone(&self.fs), prompt, templates)
    }

    pub fn build_service(&self) -> BuildService {
        BuildService::new(Arc::clone(&self.cmd), Arc::clone(&self.settings))
    }

    pub fn serve_service(&self) -> ServeService {
        ServeService::new(Arc::clone(&self.cmd), Arc::clone(&self.settings))
    }
}
