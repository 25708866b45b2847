//! Shared state of one run: AST cache, metrics and error logs.

use phpguard_core::config::{EngineConfig, PerformanceConfig};

use super::error_handler::ErrorHandler;
use super::metrics::PerformanceMetrics;
use crate::cache::AstCache;

/// Explicitly passed engine state, owned by the runner and lent to every rule.
///
/// All three members synchronize internally, so a context can be shared by
/// reference across worker threads.
pub struct EngineContext {
    cache: AstCache,
    metrics: PerformanceMetrics,
    errors: ErrorHandler,
    limits: PerformanceConfig,
}

impl EngineContext {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cache: AstCache::from_config(&config.cache),
            metrics: PerformanceMetrics::new(),
            errors: ErrorHandler::new(),
            limits: config.performance.clone(),
        }
    }

    pub fn cache(&self) -> &AstCache {
        &self.cache
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    pub fn limits(&self) -> &PerformanceConfig {
        &self.limits
    }

    /// Clear cache, metrics and logs.
    pub fn reset(&self) {
        self.cache.clear();
        self.metrics.clear();
        self.errors.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("cache", &self.cache.stats())
            .field("errors", &self.errors.error_stats())
            .finish()
    }
}
