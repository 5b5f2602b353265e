//! DisputeRepository port.

use async_trait::async_trait;

use crate::domain::disputes::Dispute;
use crate::domain::foundation::{DisputeId, MatchId};

use super::StorageError;

/// Storage for dispute records.
#[async_trait]
pub trait DisputeRepository: Send + Sync {
    /// Stores a newly opened dispute.
    ///
    /// Fails with `Duplicate` when the match already has an unresolved
    /// dispute; that uniqueness lives here so two concurrent filings
    /// cannot both land.
    async fn insert(&self, dispute: &Dispute) -> Result<(), StorageError>;

    /// Loads one dispute.
    async fn get(&self, id: DisputeId) -> Result<Dispute, StorageError>;

    /// Replaces a stored dispute after a workflow step.
    async fn update(&self, dispute: &Dispute) -> Result<(), StorageError>;

    /// The unresolved dispute for a match, if one exists.
    async fn find_unresolved(&self, match_id: MatchId) -> Result<Option<Dispute>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn DisputeRepository) {}
}
