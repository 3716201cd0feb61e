//! Application identity stamped into every record header

use crate::codec::RecordHeader;

/// Owner application and running instance of the writer.
///
/// Passed to the `Datastore` at construction; there is no process-global
/// server manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppIdentity {
    /// Application that owns the records written
    pub owner_app_id: [u8; 32],
    /// Instance of that application doing the writing
    pub app_instance_id: [u8; 32],
}

impl AppIdentity {
    pub fn new(owner_app_id: [u8; 32], app_instance_id: [u8; 32]) -> Self {
        Self {
            owner_app_id,
            app_instance_id,
        }
    }

    /// Writes the identity into a header, leaving the other fields alone.
    pub fn stamp(&self, header: &mut RecordHeader) {
        header.owner_app_id = self.owner_app_id;
        header.app_instance_id = self.app_instance_id;
    }
}
