use crate::hashed::HashedRecord;
use crate::ids::{RecordId, Timestamp};
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bundle of entries that must balance across every ledger they touch.
/// `auth_scripts` is excluded from the hash: the same transaction may be
/// re-authorized without changing its ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,
    pub entry_ids: Vec<RecordId>,
    pub ledger_ids: Vec<RecordId>,
    pub timestamp: Timestamp,
    pub details: Value,
    pub auth_scripts: BTreeMap<RecordId, Vec<u8>>,
}

impl Transaction {
    /// Assembles a Transaction from already-sorted entry/ledger ID lists
    /// and stamps its ID. Callers (the transaction validator) are
    /// responsible for sorting and for having already run every other
    /// `prepare` step.
    pub fn assemble(
        mut entry_ids: Vec<RecordId>,
        mut ledger_ids: Vec<RecordId>,
        timestamp: Timestamp,
        details: Value,
        auth_scripts: BTreeMap<RecordId, Vec<u8>>,
    ) -> Self {
        entry_ids.sort();
        ledger_ids.sort();
        let mut txn = Transaction {
            id: RecordId::from_hex(""),
            entry_ids,
            ledger_ids,
            timestamp,
            details,
            auth_scripts,
        };
        txn.id = txn.generate_id();
        txn
    }

    /// Comma-joined storage form of `entry_ids`.
    pub fn entry_ids_csv(&self) -> String {
        self.entry_ids.iter().map(RecordId::as_str).collect::<Vec<_>>().join(",")
    }

    /// Comma-joined storage form of `ledger_ids`.
    pub fn ledger_ids_csv(&self) -> String {
        self.ledger_ids.iter().map(RecordId::as_str).collect::<Vec<_>>().join(",")
    }
}

impl HashedRecord for Transaction {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert(
            "entry_ids".to_string(),
            Value::List(self.entry_ids.iter().map(|id| Value::Str(id.as_str().to_string())).collect()),
        );
        m.insert(
            "ledger_ids".to_string(),
            Value::List(self.ledger_ids.iter().map(|id| Value::Str(id.as_str().to_string())).collect()),
        );
        m.insert("timestamp".to_string(), Value::Str(self.timestamp.as_str().to_string()));
        m.insert("details".to_string(), self.details.clone());
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reauthorizing_does_not_change_id() {
        let txn = Transaction::assemble(
            vec![RecordId::from_hex("b"), RecordId::from_hex("a")],
            vec![RecordId::from_hex("ledger")],
            Timestamp::new("1000"),
            Value::Null,
            BTreeMap::new(),
        );
        let mut reauthorized = txn.clone();
        reauthorized
            .auth_scripts
            .insert(RecordId::from_hex("acct"), vec![1, 2, 3]);
        assert_eq!(txn.id, reauthorized.generate_id());
    }

    #[test]
    fn entry_ids_are_sorted_on_assembly() {
        let txn = Transaction::assemble(
            vec![RecordId::from_hex("b"), RecordId::from_hex("a")],
            vec![],
            Timestamp::new("1000"),
            Value::Null,
            BTreeMap::new(),
        );
        assert_eq!(txn.entry_ids, vec![RecordId::from_hex("a"), RecordId::from_hex("b")]);
    }
}
