use crate::ids::RecordId;
use ledgerchain_codec::{hash_bytes, pack, Value};
use std::collections::BTreeMap;

/// Base behavior shared by every content-addressed record: the ID is the
/// hash of the record's own fields, minus whichever fields that record
/// type excludes from the commitment (e.g. `Identity.seed`, `Account.active`).
pub trait HashedRecord {
    /// The record's stored ID.
    fn id(&self) -> &RecordId;

    /// The canonical field map this record hashes over — already filtered
    /// to exclude whatever that record type excludes from the hash.
    fn hashed_fields(&self) -> BTreeMap<String, Value>;

    /// Recomputes the ID from `hashed_fields()`.
    fn generate_id(&self) -> RecordId {
        generate_id(&self.hashed_fields())
    }

    /// True iff the stored ID matches the recomputed one (invariant 1).
    fn id_is_valid(&self) -> bool {
        *self.id() == self.generate_id()
    }
}

/// Computes `hex(hash(canonical(map)))` for an arbitrary field map. This is
/// the one place every record type's `generate_id` bottoms out at.
pub fn generate_id(fields: &BTreeMap<String, Value>) -> RecordId {
    let bytes = pack(&Value::Map(fields.clone()));
    RecordId(hash_bytes(&bytes))
}
