use ledgerchain_core::RecordId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Which entity a `DeletedModel` tombstone's `record` bytes deserialize
/// into. Stands in for the Python source's dynamic `{cls -> factory}`
/// registry with a closed, typed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelClass {
    Transaction,
    Entry,
}

/// A tombstone left behind by a hard delete: `{model_class, record_id,
/// record}` where `record` is the bincode encoding of the deleted row,
/// so it can be restored (or just inspected for audit) later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedModel {
    pub model_class: ModelClass,
    pub record_id: RecordId,
    pub record: Vec<u8>,
}

impl DeletedModel {
    pub fn new(model_class: ModelClass, record_id: RecordId, record: &impl Serialize) -> Self {
        let bytes = bincode::serialize(record).expect("in-memory struct always encodes");
        DeletedModel { model_class, record_id, record: bytes }
    }

    /// Decodes `record` back into `T`. Caller must pass the type that
    /// matches `model_class`.
    pub fn restore_as<T: DeserializeOwned>(&self) -> Result<T, bincode::Error> {
        bincode::deserialize(&self.record)
    }
}
