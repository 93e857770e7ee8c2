use crate::correspondence::CorrespondenceService;
use bitcoin::secp256k1::XOnlyPublicKey;
use ledgerchain_core::rollup::{fold_entry, RollupScope};
use ledgerchain_core::{Amount, Correspondence, EntryType, LedgerError, RecordId, Timestamp, Transaction, TxRollup};
use ledgerchain_script::{make_multisig_lock, Cache, Contracts, ScriptRuntime};
use ledgerchain_storage::LedgerDb;
use std::collections::{BTreeMap, BTreeSet};

/// Assembles, validates, proves against, and trims `TxRollup`s. Needs a
/// script runtime only for `validate`'s joint-authorization check — the
/// balance fold and Merkle commitment are runtime-free.
pub struct TxRollupEngine<'a> {
    db: &'a LedgerDb,
    runtime: &'a dyn ScriptRuntime,
}

impl<'a> TxRollupEngine<'a> {
    pub fn new(db: &'a LedgerDb, runtime: &'a dyn ScriptRuntime) -> Self {
        Self { db, runtime }
    }

    fn entry_ids_of(&self, tx_id: &RecordId) -> Result<Vec<RecordId>, LedgerError> {
        if let Some(txn) = self.db.get_transaction(tx_id)? {
            return Ok(txn.entry_ids);
        }
        if let Some(archived) = self.db.get_archived_transaction(tx_id)? {
            return Ok(archived.entry_ids);
        }
        Err(LedgerError::value_error(format!("unknown transaction {tx_id}")))
    }

    fn entry_or_archived(
        &self,
        entry_id: &RecordId,
    ) -> Result<(RecordId, EntryType, Amount), LedgerError> {
        if let Some(entry) = self.db.get_entry(entry_id)? {
            return Ok((entry.account_id, entry.entry_type, entry.amount));
        }
        if let Some(archived) = self.db.get_archived_entry(entry_id)? {
            return Ok((archived.account_id, archived.entry_type, archived.amount));
        }
        Err(LedgerError::value_error(format!("unknown entry {entry_id}")))
    }

    #[tracing::instrument(skip(self, txns, correspondence))]
    pub fn prepare(
        &self,
        txns: &[Transaction],
        parent_id: Option<RecordId>,
        correspondence: Option<&Correspondence>,
        timestamp: Timestamp,
    ) -> Result<TxRollup, LedgerError> {
        if txns.is_empty() {
            return Err(LedgerError::value_error("cannot roll up zero transactions"));
        }

        let scope_accounts: Option<BTreeSet<RecordId>> = match correspondence {
            Some(c) => {
                let service = CorrespondenceService::new(self.db);
                let accounts = service.get_accounts(&c.identity_ids[0], &c.identity_ids[1])?;
                Some(accounts.into_iter().map(|a| a.id).collect())
            }
            None => None,
        };

        let mut plain_ledger_id: Option<RecordId> = None;

        for txn in txns {
            for entry_id in &txn.entry_ids {
                let (account_id, _, _) = self.entry_or_archived(entry_id)?;
                let account = self.db.get_account(&account_id)?.ok_or_else(|| {
                    LedgerError::value_error(format!("unknown account {account_id}"))
                })?;
                match &scope_accounts {
                    Some(set) => {
                        if !set.contains(&account.id) {
                            return Err(LedgerError::value_error(format!(
                                "account {} not part of correspondence scope",
                                account.id
                            )));
                        }
                    }
                    None => {
                        let expected = plain_ledger_id.get_or_insert_with(|| account.ledger_id.clone());
                        if &account.ledger_id != expected {
                            return Err(LedgerError::value_error(format!(
                                "account {} outside rollup ledger scope",
                                account.id
                            )));
                        }
                    }
                }
            }
        }

        let mut tx_ids: Vec<RecordId> = txns.iter().map(|t| t.id.clone()).collect();
        tx_ids.sort();
        let leaves: Vec<ledgerchain_merkle::Leaf> =
            tx_ids.iter().map(leaf_of).collect::<Result<_, _>>()?;
        let (_trie, root) = ledgerchain_merkle::build(&leaves);
        let tx_root = hex::encode(root);

        let (height, mut balances) = match &parent_id {
            Some(pid) => {
                let parent = self
                    .db
                    .get_tx_rollup(pid)?
                    .ok_or_else(|| LedgerError::value_error(format!("unknown parent rollup {pid}")))?;
                (parent.height + 1, parent.balances.clone())
            }
            None => (0, BTreeMap::new()),
        };

        for txn in txns {
            for entry_id in &txn.entry_ids {
                let (account_id, entry_type, amount) = self.entry_or_archived(entry_id)?;
                fold_entry(&mut balances, account_id, entry_type, amount);
            }
        }

        let scope = match correspondence {
            Some(c) => RollupScope::Correspondence(c.id.clone()),
            None => RollupScope::Ledger(
                plain_ledger_id.expect("non-empty txns always fix a ledger scope"),
            ),
        };

        Ok(TxRollup::assemble(height, parent_id, tx_ids, tx_root, scope, balances, timestamp))
    }

    /// Recomputes height, balances, and (when scoped to a correspondence)
    /// joint authorization. Uses archived records as a fallback so a
    /// rollup remains valid after its own transactions have been trimmed.
    pub fn validate(&self, rollup: &TxRollup) -> Result<bool, LedgerError> {
        let parent = match &rollup.parent_id {
            Some(pid) => match self.db.get_tx_rollup(pid)? {
                Some(p) => Some(p),
                None => return Ok(false),
            },
            None => None,
        };

        match (&parent, rollup.height) {
            (Some(_), 0) => return Ok(false),
            (None, h) if h != 0 => return Ok(false),
            _ => {}
        }
        if let Some(p) = &parent {
            if rollup.height != p.height + 1 {
                return Ok(false);
            }
        }

        let mut balances = parent.as_ref().map(|p| p.balances.clone()).unwrap_or_default();
        for tx_id in &rollup.tx_ids {
            let entry_ids = match self.entry_ids_of(tx_id) {
                Ok(ids) => ids,
                Err(_) => return Ok(false),
            };
            for entry_id in entry_ids {
                match self.entry_or_archived(&entry_id) {
                    Ok((account_id, entry_type, amount)) => {
                        fold_entry(&mut balances, account_id, entry_type, amount)
                    }
                    Err(_) => return Ok(false),
                }
            }
        }

        if balances != rollup.balances {
            return Ok(false);
        }

        if let Some(correspondence_id) = rollup.correspondence_id() {
            let correspondence = match self.db.get_correspondence(correspondence_id)? {
                Some(c) => c,
                None => return Ok(false),
            };
            let lock = self.joint_auth_lock(&correspondence)?;
            if let Some(lock_bytes) = lock {
                let auth = rollup.auth_script.clone().unwrap_or_default();
                let mut combined = auth;
                combined.extend_from_slice(&lock_bytes);
                let mut cache = Cache::new();
                cache.insert("sigfield1".to_string(), rollup.id.to_bytes().unwrap_or_default());
                if !self.runtime.verify(&combined, &cache, &Contracts::new()) {
                    tracing::warn!(rollup_id = %rollup.id, "joint authorization failed");
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    fn joint_auth_lock(&self, correspondence: &Correspondence) -> Result<Option<Vec<u8>>, LedgerError> {
        if let Some(lock) = correspondence.txru_lock() {
            return Ok(Some(lock));
        }
        let mut pubkeys = Vec::with_capacity(2);
        for identity_id in &correspondence.identity_ids {
            let identity = self
                .db
                .get_identity(identity_id)?
                .ok_or_else(|| LedgerError::value_error(format!("unknown identity {identity_id}")))?;
            match identity.pubkey.as_deref().and_then(|pk| XOnlyPublicKey::from_slice(pk).ok()) {
                Some(xonly) => pubkeys.push(xonly),
                None => return Ok(None),
            }
        }
        Ok(Some(make_multisig_lock(&pubkeys)))
    }

    pub fn prove_inclusion(&self, rollup: &TxRollup, tx_id: &RecordId) -> Result<Vec<u8>, LedgerError> {
        let leaves: Vec<ledgerchain_merkle::Leaf> =
            rollup.tx_ids.iter().map(leaf_of).collect::<Result<_, _>>()?;
        let (trie, _root) = ledgerchain_merkle::build(&leaves);
        let leaf = leaf_of(tx_id)?;
        ledgerchain_merkle::prove(&trie, &leaf).map_err(|e| LedgerError::value_error(e.to_string()))
    }

    pub fn verify_inclusion(&self, rollup: &TxRollup, proof: &[u8]) -> Result<bool, LedgerError> {
        let root_bytes = hex::decode(&rollup.tx_root).map_err(|e| LedgerError::EncodingError(e.to_string()))?;
        let len = root_bytes.len();
        let root: ledgerchain_merkle::Leaf = root_bytes
            .try_into()
            .map_err(|_| LedgerError::EncodingError(format!("tx_root is {len} bytes, expected 32")))?;
        ledgerchain_merkle::verify(&root, proof).map_err(|e| LedgerError::value_error(e.to_string()))
    }

    /// Requires `validate() == true`; archives (if `archive`) then deletes
    /// every rolled-up transaction and its entries, one storage
    /// transaction per Transaction. Returns the number removed.
    #[tracing::instrument(skip(self, rollup))]
    pub fn trim(&self, rollup: &TxRollup, archive: bool) -> Result<usize, LedgerError> {
        if !self.validate(rollup)? {
            return Err(LedgerError::value_error("cannot trim an unvalidated rollup"));
        }

        let mut count = 0;
        for tx_id in &rollup.tx_ids {
            let txn = match self.db.get_transaction(tx_id)? {
                Some(txn) => txn,
                None => continue,
            };
            let mut entries = Vec::with_capacity(txn.entry_ids.len());
            for entry_id in &txn.entry_ids {
                if let Some(entry) = self.db.get_entry(entry_id)? {
                    entries.push(entry);
                }
            }
            self.db.trim_transaction(&txn, &entries, archive)?;
            count += 1;
        }

        tracing::info!(rollup_id = %rollup.id, removed = count, "rollup trimmed");
        Ok(count)
    }
}

fn leaf_of(id: &RecordId) -> Result<ledgerchain_merkle::Leaf, LedgerError> {
    let bytes = id.to_bytes().map_err(|e| LedgerError::EncodingError(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| LedgerError::EncodingError(format!("record id is {len} bytes, expected 32")))
}
