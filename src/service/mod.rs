pub mod attendance;
pub mod manager;
pub mod stats;

use crate::error::AttendanceError;
use crate::store::StoreError;

/// Unexpected store failures surface as `System`; a `DuplicateKey` outside
/// `create` means the backend broke its own contract.
pub(crate) fn store_failure(err: StoreError) -> AttendanceError {
    tracing::error!(error = %err, "store operation failed");
    AttendanceError::System(err.into())
}
