//! Rule execution engine: shared run context, instrumentation, error logs and
//! the file × rule orchestrator.

pub mod context;
pub mod error_handler;
pub mod metrics;
pub mod runner;

pub use context::EngineContext;
pub use error_handler::{ErrorCategory, ErrorContext, ErrorHandler, ErrorRecord, ErrorReport, ErrorStats};
pub use metrics::{PerformanceMetrics, Phase, RuleTiming};
pub use runner::{ProgressCallback, RuleRunner, RunReport, RunState};
