//! Conversion observer abstractions.
//!
//! Defines the [`ConversionObserver`] trait so per-turn outcomes (timings,
//! routes, failures) can be reported without the converter knowing where
//! they go.

use std::time::Duration;

use tracing::{debug, warn};

use super::Role;
use crate::error::ConversionError;
use crate::markdown::ConversionRoute;

/// Receives one event per converted turn.
pub trait ConversionObserver {
  /// Called after a turn converts successfully.
  ///
  /// # Arguments
  /// * `index` - Zero-based position of the turn in the transcript.
  /// * `role` - Speaker of the turn.
  /// * `route` - Code path the turn's fragment took.
  /// * `elapsed` - Wall time spent converting the turn.
  fn turn_converted(&self, index: usize, role: Role, route: ConversionRoute, elapsed: Duration);

  /// Called when a turn's fragment fails to convert. The turn's content is
  /// replaced by an error marker; the remaining turns still run.
  fn turn_failed(&self, index: usize, role: Role, error: &ConversionError);
}

/// Default observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConversionObserver for TracingObserver {
  fn turn_converted(&self, index: usize, role: Role, route: ConversionRoute, elapsed: Duration) {
    debug!("Turn {index} ({role}) converted via {route} route in {elapsed:?}");
  }

  fn turn_failed(&self, index: usize, role: Role, error: &ConversionError) {
    warn!("Turn {index} ({role}) failed to convert: {error}");
  }
}
