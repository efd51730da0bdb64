//! Progress/diagnostic channel and output sink provided by the host.

use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use thiserror::Error;

use crate::matrix::{OutputRow, OutputSchema};

/// Receives informational and error messages and reports cancellation.
pub trait Feedback {
    /// Record an informational message.
    fn push_info(&self, message: &str);

    /// Record an error message.
    fn report_error(&self, message: &str);

    /// Return `true` once the host asked the invocation to stop.
    fn is_canceled(&self) -> bool {
        false
    }
}

/// [`Feedback`] forwarding messages to the `log` facade.
///
/// Cancellation is driven through a shared flag so another thread (a signal
/// handler, a UI) can stop the invocation.
///
/// # Examples
/// ```
/// use waymatrix_core::{Feedback, LogFeedback};
///
/// let feedback = LogFeedback::default();
/// let flag = feedback.cancel_flag();
/// assert!(!feedback.is_canceled());
/// flag.store(true, std::sync::atomic::Ordering::SeqCst);
/// assert!(feedback.is_canceled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogFeedback {
    canceled: Arc<AtomicBool>,
}

impl LogFeedback {
    /// Create a feedback channel sharing an existing cancellation flag.
    pub const fn with_cancel_flag(canceled: Arc<AtomicBool>) -> Self {
        Self { canceled }
    }

    /// Return a handle to the cancellation flag.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.canceled)
    }
}

impl Feedback for LogFeedback {
    fn push_info(&self, message: &str) {
        info!("{message}");
    }

    fn report_error(&self, message: &str) {
        error!("{message}");
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// Error returned by a [`MatrixSink`].
#[derive(Debug, Error)]
#[error("failed to write matrix output: {source}")]
pub struct SinkError {
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl SinkError {
    /// Wrap the underlying writer error.
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Destination for the output table.
///
/// The whole row set arrives in one call so a sink never sees partial
/// output.
pub trait MatrixSink {
    /// Write the schema and every row.
    fn write_rows(&mut self, schema: &OutputSchema, rows: &[OutputRow]) -> Result<(), SinkError>;
}
