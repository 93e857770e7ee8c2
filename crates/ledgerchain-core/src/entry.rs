use crate::enums::EntryType;
use crate::hashed::HashedRecord;
use crate::ids::{Amount, RecordId};
use ledgerchain_codec::Value;
use ledgerchain_script::Cache;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable single-sided posting. The `nonce` guarantees ID
/// distinctness for otherwise identical postings (same account, type,
/// amount, details).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: RecordId,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub nonce: Vec<u8>,
    pub account_id: RecordId,
    pub details: Value,
}

impl Entry {
    /// Builds an entry and stamps its ID. `nonce` should be random bytes
    /// supplied by the caller (16 bytes is the convention used by the
    /// end-to-end scenarios); a shared nonce across sibling entries is
    /// fine — distinctness comes from the full field tuple.
    pub fn new(
        entry_type: EntryType,
        amount: Amount,
        nonce: Vec<u8>,
        account_id: RecordId,
        details: Value,
    ) -> Self {
        let mut entry = Entry {
            id: RecordId::from_hex(""),
            entry_type,
            amount,
            nonce,
            account_id,
            details,
        };
        entry.id = entry.generate_id();
        entry
    }

    /// Returns the sigfields fed into the script runtime's cache for
    /// signature checks: by default, just `sigfield1 = fromhex(id)`.
    pub fn get_sigfields(&self) -> Cache {
        let mut cache = Cache::new();
        cache.insert("sigfield1".to_string(), self.id.to_bytes().unwrap_or_default());
        cache
    }
}

/// Generates a fresh 16-byte nonce for `Entry::new`. Callers that need a
/// shared nonce across sibling entries should generate it once and reuse
/// it rather than calling this per entry.
pub fn random_nonce() -> Vec<u8> {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.to_vec()
}

impl HashedRecord for Entry {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert("type".to_string(), Value::Str(self.entry_type.code().to_string()));
        m.insert("amount".to_string(), Value::Int(self.amount));
        m.insert("nonce".to_string(), Value::Bytes(self.nonce.clone()));
        m.insert("account_id".to_string(), Value::Str(self.account_id.as_str().to_string()));
        m.insert("details".to_string(), self.details.clone());
        m
    }
}
