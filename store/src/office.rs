//! Office configuration source.

use clockin_types::OfficeLocation;

use crate::StoreError;

/// Read-only access to the configured offices.
pub trait OfficeDirectory {
    fn offices(&self) -> Result<Vec<OfficeLocation>, StoreError>;
}
