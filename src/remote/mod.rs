//! Transport abstraction for the remote session endpoints.
//!
//! The coordinator only ever talks to an opaque "execute"/"poll" endpoint
//! pair. This module defines that seam as a trait so different transports
//! (and test doubles) can be used interchangeably.

mod mock;
mod types;

pub use mock::{FailingTransport, MockTransport};
pub use types::{IncrementalReply, StatementDecomposition, SubmitReply, SubmitRequest};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface to a remote session.
///
/// All operations are async and return Results with CourierError. One
/// implementation serves many sessions; requests are addressed by the
/// encoded session target.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Submits a statement batch for execution on the addressed session.
    async fn submit(&self, target: &str, request: &SubmitRequest) -> Result<SubmitReply>;

    /// Fetches results in the batch-complete shape.
    ///
    /// An empty list means "not ready yet"; a non-empty list is the full,
    /// final result set.
    async fn fetch_batch(&self, request_id: &str) -> Result<Vec<crate::results::StatementResult>>;

    /// Fetches results in the incremental shape.
    ///
    /// The reply carries a partial batch and a `finished` flag that
    /// determines whether further polls are needed.
    async fn fetch_incremental(&self, request_id: &str) -> Result<IncrementalReply>;
}
