use ledgerchain_core::{
    Account, Entry, EntryType, HashedRecord, LedgerError, RecordId, Timestamp, Transaction,
};
use ledgerchain_codec::Value;
use ledgerchain_script::{Cache, Contracts, ScriptRuntime};
use ledgerchain_storage::LedgerDb;
use std::collections::BTreeMap;

/// Prepares and validates transactions against persisted accounts/entries
/// and a script runtime, following the nine-step order: id check,
/// uniqueness, scope collection, auth presence, balance, build,
/// authorization, id assignment.
pub struct TransactionValidator<'a> {
    db: &'a LedgerDb,
    runtime: &'a dyn ScriptRuntime,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(db: &'a LedgerDb, runtime: &'a dyn ScriptRuntime) -> Self {
        Self { db, runtime }
    }

    fn load_accounts(&self, entries: &[Entry]) -> Result<BTreeMap<RecordId, Account>, LedgerError> {
        let mut accounts = BTreeMap::new();
        for entry in entries {
            if !accounts.contains_key(&entry.account_id) {
                let account = self.db.get_account(&entry.account_id)?.ok_or_else(|| {
                    LedgerError::value_error(format!("unknown account {}", entry.account_id))
                })?;
                accounts.insert(entry.account_id.clone(), account);
            }
        }
        Ok(accounts)
    }

    #[tracing::instrument(skip(self, entries, auth_scripts, details, contracts))]
    pub fn prepare(
        &self,
        entries: &[Entry],
        timestamp: Timestamp,
        auth_scripts: BTreeMap<RecordId, Vec<u8>>,
        details: Value,
        contracts: &Contracts,
    ) -> Result<Transaction, LedgerError> {
        for entry in entries {
            if !entry.id_is_valid() {
                return Err(LedgerError::type_error("entry id does not match its fields"));
            }
        }

        for entry in entries {
            if let Some(owner) = self.db.transaction_containing_entry(&entry.id)? {
                return Err(LedgerError::value_error(format!(
                    "entry {} already contained within a Transaction {owner}",
                    entry.id
                )));
            }
        }

        let accounts = self.load_accounts(entries)?;

        let mut ledger_ids: Vec<RecordId> =
            accounts.values().map(|a| a.ledger_id.clone()).collect();
        ledger_ids.sort();
        ledger_ids.dedup();

        for entry in entries {
            let account = &accounts[&entry.account_id];
            if account.locking_scripts.contains_key(&entry.entry_type)
                && !auth_scripts.contains_key(&account.id)
            {
                return Err(LedgerError::value_error(format!(
                    "missing auth script for account {}",
                    account.id
                )));
            }
        }

        for ledger_id in &ledger_ids {
            let (credit, debit) = sum_by_direction(entries, &accounts, ledger_id);
            if credit != debit {
                return Err(LedgerError::value_error(format!(
                    "ledger {ledger_id} unbalanced: credit {credit} != debit {debit}"
                )));
            }
        }

        let entry_ids: Vec<RecordId> = entries.iter().map(|e| e.id.clone()).collect();
        let txn = Transaction::assemble(entry_ids, ledger_ids, timestamp, details, auth_scripts);

        for entry in entries {
            let account = &accounts[&entry.account_id];
            if account.locking_scripts.contains_key(&entry.entry_type) {
                let auth = txn.auth_scripts.get(&account.id).cloned().unwrap_or_default();
                let cache = entry.get_sigfields();
                if !account.validate_script(entry.entry_type, &auth, self.runtime, &cache, contracts) {
                    tracing::warn!(account_id = %account.id, entry_id = %entry.id, "script validation failed");
                    return Err(LedgerError::auth_error("validation failed"));
                }
            }
        }

        Ok(txn)
    }

    /// Re-runs the auth-presence, balance, and authorization checks
    /// against the persisted entries. Returns `false` rather than erroring
    /// for any semantic mismatch or missing row; a genuine storage failure
    /// still propagates as `Err`.
    pub fn validate(&self, txn: &Transaction, contracts: &Contracts) -> Result<bool, LedgerError> {
        let mut entries = Vec::with_capacity(txn.entry_ids.len());
        for id in &txn.entry_ids {
            match self.db.get_entry(id)? {
                Some(entry) => entries.push(entry),
                None => return Ok(false),
            }
        }

        let mut accounts = BTreeMap::new();
        for entry in &entries {
            if !accounts.contains_key(&entry.account_id) {
                match self.db.get_account(&entry.account_id)? {
                    Some(account) => {
                        accounts.insert(entry.account_id.clone(), account);
                    }
                    None => return Ok(false),
                }
            }
        }

        for entry in &entries {
            let account = &accounts[&entry.account_id];
            if account.locking_scripts.contains_key(&entry.entry_type)
                && !txn.auth_scripts.contains_key(&account.id)
            {
                return Ok(false);
            }
        }

        for ledger_id in &txn.ledger_ids {
            let (credit, debit) = sum_by_direction(&entries, &accounts, ledger_id);
            if credit != debit {
                return Ok(false);
            }
        }

        for entry in &entries {
            let account = &accounts[&entry.account_id];
            if account.locking_scripts.contains_key(&entry.entry_type) {
                let auth = txn.auth_scripts.get(&account.id).cloned().unwrap_or_default();
                let cache = entry.get_sigfields();
                if !account.validate_script(entry.entry_type, &auth, self.runtime, &cache, contracts) {
                    tracing::warn!(account_id = %account.id, entry_id = %entry.id, "script validation failed");
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}

fn sum_by_direction(
    entries: &[Entry],
    accounts: &BTreeMap<RecordId, Account>,
    ledger_id: &RecordId,
) -> (i64, i64) {
    let mut credit = 0i64;
    let mut debit = 0i64;
    for entry in entries {
        let account = &accounts[&entry.account_id];
        if &account.ledger_id == ledger_id {
            match entry.entry_type {
                EntryType::Credit => credit += entry.amount,
                EntryType::Debit => debit += entry.amount,
            }
        }
    }
    (credit, debit)
}
