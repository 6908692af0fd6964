//! Compile service errors

use tokio::task::JoinError;

/// Result type for compile service operations
pub type Result<T> = anyhow::Result<T>;

/// Failures of the service machinery itself. Compile errors never show up
/// here; they are published as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The blocking compile task did not complete
    #[error("compile task for generation {generation} failed")]
    CompileTask {
        /// Generation of the job being compiled
        generation: u64,
        /// Join failure from the blocking pool
        #[source]
        source: JoinError,
    },

    /// The worker task died before handing the compiler back
    #[error("compile worker stopped abnormally")]
    WorkerLost(#[source] JoinError),

    /// The worker stopped while a compile task still held the compiler
    #[error("compiler is still held by a compile task")]
    CompilerInUse,
}
