use crate::enums::EntryType;
use crate::hashed::HashedRecord;
use crate::ids::{Amount, RecordId, Timestamp};
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Either the rollup belongs to a single ledger, or it belongs to a
/// bilateral correspondence — never both, never neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollupScope {
    Ledger(RecordId),
    Correspondence(RecordId),
}

/// A height-chained, Merkle-aggregated snapshot of a batch of
/// transactions plus the account balances after them. `tx_ids` and
/// `auth_script` are excluded from the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRollup {
    pub id: RecordId,
    pub height: u64,
    pub parent_id: Option<RecordId>,
    pub tx_ids: Vec<RecordId>,
    pub tx_root: String,
    pub scope: RollupScope,
    pub balances: BTreeMap<RecordId, (EntryType, Amount)>,
    pub timestamp: Timestamp,
    pub auth_script: Option<Vec<u8>>,
}

impl TxRollup {
    /// Assembles a rollup from already-computed pieces (tx_ids sorted,
    /// tx_root computed by the Merkle binding, balances already folded)
    /// and stamps its ID. Callers (`TxRollupEngine::prepare`) own every
    /// other step.
    pub fn assemble(
        height: u64,
        parent_id: Option<RecordId>,
        mut tx_ids: Vec<RecordId>,
        tx_root: String,
        scope: RollupScope,
        balances: BTreeMap<RecordId, (EntryType, Amount)>,
        timestamp: Timestamp,
    ) -> Self {
        tx_ids.sort();
        let mut rollup = TxRollup {
            id: RecordId::from_hex(""),
            height,
            parent_id,
            tx_ids,
            tx_root,
            scope,
            balances,
            timestamp,
            auth_script: None,
        };
        rollup.id = rollup.generate_id();
        rollup
    }

    pub fn ledger_id(&self) -> Option<&RecordId> {
        match &self.scope {
            RollupScope::Ledger(id) => Some(id),
            RollupScope::Correspondence(_) => None,
        }
    }

    pub fn correspondence_id(&self) -> Option<&RecordId> {
        match &self.scope {
            RollupScope::Correspondence(id) => Some(id),
            RollupScope::Ledger(_) => None,
        }
    }

    pub fn tx_ids_csv(&self) -> String {
        self.tx_ids.iter().map(RecordId::as_str).collect::<Vec<_>>().join(",")
    }
}

impl HashedRecord for TxRollup {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut balances = BTreeMap::new();
        for (account_id, (entry_type, amount)) in &self.balances {
            balances.insert(
                account_id.as_str().to_string(),
                Value::List(vec![Value::Str(entry_type.code().to_string()), Value::Int(*amount)]),
            );
        }
        let mut m = BTreeMap::new();
        m.insert("height".to_string(), Value::Int(self.height as i64));
        m.insert(
            "parent_id".to_string(),
            match &self.parent_id {
                Some(id) => Value::Str(id.as_str().to_string()),
                None => Value::Null,
            },
        );
        m.insert("tx_root".to_string(), Value::Str(self.tx_root.clone()));
        match &self.scope {
            RollupScope::Ledger(id) => {
                m.insert("correspondence_id".to_string(), Value::Null);
                m.insert("ledger_id".to_string(), Value::Str(id.as_str().to_string()));
            }
            RollupScope::Correspondence(id) => {
                m.insert("correspondence_id".to_string(), Value::Str(id.as_str().to_string()));
                m.insert("ledger_id".to_string(), Value::Null);
            }
        }
        m.insert("balances".to_string(), Value::Map(balances));
        m.insert("timestamp".to_string(), Value::Str(self.timestamp.as_str().to_string()));
        m
    }
}

/// Applies one entry's contribution to a balance map, implementing the
/// fold rule from `TxRollup::prepare`/`validate`:
/// `net = signed(balances[aid]) + (+amount if CREDIT else -amount)`,
/// re-expressed as `(CREDIT, net)` if `net >= 0` else `(DEBIT, -net)`.
pub fn fold_entry(
    balances: &mut BTreeMap<RecordId, (EntryType, Amount)>,
    account_id: RecordId,
    entry_type: EntryType,
    amount: Amount,
) {
    let current = balances
        .get(&account_id)
        .map(|(t, a)| signed(*t, *a))
        .unwrap_or(0);
    let delta = match entry_type {
        EntryType::Credit => amount,
        EntryType::Debit => -amount,
    };
    let net = current + delta;
    let folded = if net >= 0 { (EntryType::Credit, net) } else { (EntryType::Debit, -net) };
    balances.insert(account_id, folded);
}

fn signed(entry_type: EntryType, amount: Amount) -> i64 {
    match entry_type {
        EntryType::Credit => amount,
        EntryType::Debit => -amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_entry_flips_sign_when_net_goes_negative() {
        let mut balances = BTreeMap::new();
        let acct = RecordId::from_hex("acct");
        fold_entry(&mut balances, acct.clone(), EntryType::Credit, 100);
        assert_eq!(balances[&acct], (EntryType::Credit, 100));
        fold_entry(&mut balances, acct.clone(), EntryType::Debit, 150);
        assert_eq!(balances[&acct], (EntryType::Debit, 50));
    }

    #[test]
    fn root_height_is_zero_without_parent() {
        let rollup = TxRollup::assemble(
            0,
            None,
            vec![RecordId::from_hex("tx1")],
            "root".to_string(),
            RollupScope::Ledger(RecordId::from_hex("ledger")),
            BTreeMap::new(),
            Timestamp::new("1000"),
        );
        assert_eq!(rollup.height, 0);
        assert!(rollup.id_is_valid());
    }

    #[test]
    fn tx_ids_excluded_from_hash() {
        let base = TxRollup::assemble(
            0,
            None,
            vec![RecordId::from_hex("tx1")],
            "root".to_string(),
            RollupScope::Ledger(RecordId::from_hex("ledger")),
            BTreeMap::new(),
            Timestamp::new("1000"),
        );
        let mut other_tx_ids = base.clone();
        other_tx_ids.tx_ids = vec![RecordId::from_hex("tx1"), RecordId::from_hex("tx2")];
        assert_eq!(base.id, other_tx_ids.generate_id());
    }
}
