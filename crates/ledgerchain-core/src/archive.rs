use crate::entry::Entry;
use crate::enums::EntryType;
use crate::ids::{Amount, RecordId, Timestamp};
use crate::transaction::Transaction;
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A post-trim immutable snapshot of a Transaction, keyed by the same ID
/// so Merkle inclusion proofs against the owning rollup's `tx_root`
/// remain valid after the live row is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedTransaction {
    pub id: RecordId,
    pub entry_ids: Vec<RecordId>,
    pub ledger_ids: Vec<RecordId>,
    pub timestamp: Timestamp,
    pub details: Value,
}

impl From<&Transaction> for ArchivedTransaction {
    fn from(txn: &Transaction) -> Self {
        ArchivedTransaction {
            id: txn.id.clone(),
            entry_ids: txn.entry_ids.clone(),
            ledger_ids: txn.ledger_ids.clone(),
            timestamp: txn.timestamp.clone(),
            details: txn.details.clone(),
        }
    }
}

/// A post-trim immutable snapshot of an Entry, same ID as the live row it
/// replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedEntry {
    pub id: RecordId,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub nonce: Vec<u8>,
    pub account_id: RecordId,
    pub details: Value,
}

impl From<&Entry> for ArchivedEntry {
    fn from(entry: &Entry) -> Self {
        ArchivedEntry {
            id: entry.id.clone(),
            entry_type: entry.entry_type,
            amount: entry.amount,
            nonce: entry.nonce.clone(),
            account_id: entry.account_id.clone(),
            details: entry.details.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archiving_preserves_id() {
        let entry = Entry::new(
            EntryType::Credit,
            10,
            vec![1, 2, 3],
            RecordId::from_hex("acct"),
            Value::Null,
        );
        let archived = ArchivedEntry::from(&entry);
        assert_eq!(archived.id, entry.id);
    }
}
