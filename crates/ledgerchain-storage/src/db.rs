use crate::config::LedgerConfig;
use crate::tombstone::{DeletedModel, ModelClass};
use ledgerchain_core::{
    Account, ArchivedEntry, ArchivedTransaction, Correspondence, Currency, Entry, Identity,
    Ledger, LedgerError, RecordId, Transaction, TxRollup,
};

/// Persistent state database backed by sled. One tree per entity table;
/// `entry_txn_index` is the only secondary index, maintained so the
/// uniqueness check in `Transaction::prepare` (step 3) doesn't require a
/// full table scan.
///
/// Named trees:
///   identities             — RecordId hex → bincode(Identity)
///   ledgers                — RecordId hex → bincode(Ledger)
///   currencies              — RecordId hex → bincode(Currency)
///   accounts                — RecordId hex → bincode(Account)
///   entries                 — RecordId hex → bincode(Entry)
///   transactions             — RecordId hex → bincode(Transaction)
///   entry_txn_index          — entry RecordId hex → owning transaction RecordId hex
///   correspondences          — RecordId hex → bincode(Correspondence)
///   tx_rollups               — RecordId hex → bincode(TxRollup)
///   archived_transactions    — RecordId hex → bincode(ArchivedTransaction)
///   archived_entries         — RecordId hex → bincode(ArchivedEntry)
///   deleted_models           — RecordId hex → bincode(DeletedModel)
#[derive(Clone)]
pub struct LedgerDb {
    _db: sled::Db,
    identities: sled::Tree,
    ledgers: sled::Tree,
    currencies: sled::Tree,
    accounts: sled::Tree,
    entries: sled::Tree,
    transactions: sled::Tree,
    entry_txn_index: sled::Tree,
    correspondences: sled::Tree,
    tx_rollups: sled::Tree,
    archived_transactions: sled::Tree,
    archived_entries: sled::Tree,
    deleted_models: sled::Tree,
}

fn storage_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::StorageError(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(value).map_err(storage_err)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, LedgerError> {
    bincode::deserialize(bytes).map_err(storage_err)
}

impl LedgerDb {
    /// Opens (creating if absent) the database named by `config`. Tree
    /// creation is idempotent, so there is no separate migration step.
    #[tracing::instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
    pub fn open(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let db = sled::open(&config.data_dir).map_err(storage_err)?;
        Self::from_db(db)
    }

    /// Opens an ephemeral, in-memory-backed database. Used by tests and
    /// by callers that don't need durability.
    pub fn open_temporary() -> Result<Self, LedgerError> {
        let db = sled::Config::new().temporary(true).open().map_err(storage_err)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, LedgerError> {
        let identities = db.open_tree("identities").map_err(storage_err)?;
        let ledgers = db.open_tree("ledgers").map_err(storage_err)?;
        let currencies = db.open_tree("currencies").map_err(storage_err)?;
        let accounts = db.open_tree("accounts").map_err(storage_err)?;
        let entries = db.open_tree("entries").map_err(storage_err)?;
        let transactions = db.open_tree("transactions").map_err(storage_err)?;
        let entry_txn_index = db.open_tree("entry_txn_index").map_err(storage_err)?;
        let correspondences = db.open_tree("correspondences").map_err(storage_err)?;
        let tx_rollups = db.open_tree("tx_rollups").map_err(storage_err)?;
        let archived_transactions = db.open_tree("archived_transactions").map_err(storage_err)?;
        let archived_entries = db.open_tree("archived_entries").map_err(storage_err)?;
        let deleted_models = db.open_tree("deleted_models").map_err(storage_err)?;
        tracing::info!("ledger database opened");
        Ok(Self {
            _db: db,
            identities,
            ledgers,
            currencies,
            accounts,
            entries,
            transactions,
            entry_txn_index,
            correspondences,
            tx_rollups,
            archived_transactions,
            archived_entries,
            deleted_models,
        })
    }

    // ── Identities ───────────────────────────────────────────────────────────

    pub fn put_identity(&self, identity: &Identity) -> Result<(), LedgerError> {
        self.identities
            .insert(identity.id.as_str(), encode(identity)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_identity(&self, id: &RecordId) -> Result<Option<Identity>, LedgerError> {
        match self.identities.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Ledgers ──────────────────────────────────────────────────────────────

    pub fn put_ledger(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        self.ledgers.insert(ledger.id.as_str(), encode(ledger)?).map_err(storage_err)?;
        Ok(())
    }

    pub fn get_ledger(&self, id: &RecordId) -> Result<Option<Ledger>, LedgerError> {
        match self.ledgers.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Currencies ───────────────────────────────────────────────────────────

    pub fn put_currency(&self, currency: &Currency) -> Result<(), LedgerError> {
        self.currencies
            .insert(currency.id.as_str(), encode(currency)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_currency(&self, id: &RecordId) -> Result<Option<Currency>, LedgerError> {
        match self.currencies.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn put_account(&self, account: &Account) -> Result<(), LedgerError> {
        let cycle = ledgerchain_core::account::has_parent_cycle(&account.id, |id| {
            if id == &account.id {
                account.parent_id.clone()
            } else {
                self.get_account(id).ok().flatten().and_then(|a| a.parent_id)
            }
        });
        if cycle {
            return Err(LedgerError::value_error(format!(
                "account {} would introduce a parent_id cycle",
                account.id
            )));
        }
        self.accounts.insert(account.id.as_str(), encode(account)?).map_err(storage_err)?;
        Ok(())
    }

    pub fn get_account(&self, id: &RecordId) -> Result<Option<Account>, LedgerError> {
        match self.accounts.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn children_of(&self, parent_id: &RecordId) -> Result<Vec<Account>, LedgerError> {
        let mut out = Vec::new();
        for item in self.accounts.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let account: Account = decode(&bytes)?;
            if account.parent_id.as_ref() == Some(parent_id) {
                out.push(account);
            }
        }
        Ok(out)
    }

    /// Accounts whose `name` contains `needle` — the `.contains(col,
    /// needle)` query-builder operation bound concretely for
    /// `CorrespondenceService::get_accounts`.
    pub fn accounts_where_name_contains(&self, needle: &str) -> Result<Vec<Account>, LedgerError> {
        let mut out = Vec::new();
        for item in self.accounts.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let account: Account = decode(&bytes)?;
            if account.name.contains(needle) {
                out.push(account);
            }
        }
        Ok(out)
    }

    pub fn accounts_for_ledger(&self, ledger_id: &RecordId) -> Result<Vec<Account>, LedgerError> {
        let mut out = Vec::new();
        for item in self.accounts.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let account: Account = decode(&bytes)?;
            if &account.ledger_id == ledger_id {
                out.push(account);
            }
        }
        Ok(out)
    }

    // ── Entries ──────────────────────────────────────────────────────────────

    pub fn put_entry(&self, entry: &Entry) -> Result<(), LedgerError> {
        self.entries.insert(entry.id.as_str(), encode(entry)?).map_err(storage_err)?;
        Ok(())
    }

    pub fn get_entry(&self, id: &RecordId) -> Result<Option<Entry>, LedgerError> {
        match self.entries.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every persisted entry for `account_id`, in insertion order. Callers
    /// that want the `chunk(500)` pagination behavior chunk this
    /// themselves (`Vec::chunks`) — the total-sum semantics `balance()`
    /// depends on don't care about the page size.
    pub fn entries_for_account(&self, account_id: &RecordId) -> Result<Vec<Entry>, LedgerError> {
        let mut out = Vec::new();
        for item in self.entries.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let entry: Entry = decode(&bytes)?;
            if &entry.account_id == account_id {
                out.push(entry);
            }
        }
        Ok(out)
    }

    fn delete_entry(&self, id: &RecordId) -> Result<(), LedgerError> {
        self.entries.remove(id.as_str()).map_err(storage_err)?;
        Ok(())
    }

    // ── Transactions ─────────────────────────────────────────────────────────

    pub fn put_transaction(&self, txn: &Transaction) -> Result<(), LedgerError> {
        self.transactions.insert(txn.id.as_str(), encode(txn)?).map_err(storage_err)?;
        for entry_id in &txn.entry_ids {
            self.entry_txn_index
                .insert(entry_id.as_str(), txn.id.as_str())
                .map_err(storage_err)?;
        }
        Ok(())
    }

    pub fn get_transaction(&self, id: &RecordId) -> Result<Option<Transaction>, LedgerError> {
        match self.transactions.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every persisted transaction that touches `ledger_id`, for CLI-style
    /// ledger-wide listing (e.g. gathering a rollup's candidate batch).
    pub fn transactions_for_ledger(&self, ledger_id: &RecordId) -> Result<Vec<Transaction>, LedgerError> {
        let mut out = Vec::new();
        for item in self.transactions.iter() {
            let (_, bytes) = item.map_err(storage_err)?;
            let txn: Transaction = decode(&bytes)?;
            if txn.ledger_ids.contains(ledger_id) {
                out.push(txn);
            }
        }
        Ok(out)
    }

    /// The ID of the transaction that already contains `entry_id`, if any
    /// — backs the "entry already contained within a Transaction" check.
    pub fn transaction_containing_entry(
        &self,
        entry_id: &RecordId,
    ) -> Result<Option<RecordId>, LedgerError> {
        match self.entry_txn_index.get(entry_id.as_str()).map_err(storage_err)? {
            Some(bytes) => {
                let s = String::from_utf8(bytes.to_vec()).map_err(storage_err)?;
                Ok(Some(RecordId::from_hex(s)))
            }
            None => Ok(None),
        }
    }

    fn delete_transaction(&self, txn: &Transaction) -> Result<(), LedgerError> {
        self.transactions.remove(txn.id.as_str()).map_err(storage_err)?;
        for entry_id in &txn.entry_ids {
            self.entry_txn_index.remove(entry_id.as_str()).map_err(storage_err)?;
        }
        Ok(())
    }

    // ── Correspondences ──────────────────────────────────────────────────────

    pub fn put_correspondence(&self, c: &Correspondence) -> Result<(), LedgerError> {
        self.correspondences.insert(c.id.as_str(), encode(c)?).map_err(storage_err)?;
        Ok(())
    }

    pub fn get_correspondence(&self, id: &RecordId) -> Result<Option<Correspondence>, LedgerError> {
        match self.correspondences.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── TxRollups ────────────────────────────────────────────────────────────

    pub fn put_tx_rollup(&self, rollup: &TxRollup) -> Result<(), LedgerError> {
        self.tx_rollups.insert(rollup.id.as_str(), encode(rollup)?).map_err(storage_err)?;
        Ok(())
    }

    pub fn get_tx_rollup(&self, id: &RecordId) -> Result<Option<TxRollup>, LedgerError> {
        match self.tx_rollups.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Archived records ─────────────────────────────────────────────────────

    pub fn get_archived_transaction(
        &self,
        id: &RecordId,
    ) -> Result<Option<ArchivedTransaction>, LedgerError> {
        match self.archived_transactions.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_archived_entry(&self, id: &RecordId) -> Result<Option<ArchivedEntry>, LedgerError> {
        match self.archived_entries.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Trim: archive-then-delete, one sled transaction per Transaction ─────

    /// Archives (optionally) and deletes a rolled-up transaction and its
    /// entries as a single storage transaction, so cancellation between
    /// archive and delete can never leave a half-trimmed row. When
    /// `archive` is false, a `DeletedModel` tombstone is written for the
    /// transaction and each of its entries before the delete, so a
    /// trimmed row is always either an Archived* record or a tombstone,
    /// never silently gone — writing the tombstone ahead of the delete is
    /// the one non-atomic moment the concurrency model calls out.
    #[tracing::instrument(skip(self, txn, entries), fields(tx_id = %txn.id))]
    pub fn trim_transaction(
        &self,
        txn: &Transaction,
        entries: &[Entry],
        archive: bool,
    ) -> Result<(), LedgerError> {
        use sled::Transactional;

        if !archive {
            self.insert_deleted_model(ModelClass::Transaction, txn.id.clone(), txn)?;
            for entry in entries {
                self.insert_deleted_model(ModelClass::Entry, entry.id.clone(), entry)?;
            }
        }

        let trees = (
            &self.transactions,
            &self.entries,
            &self.entry_txn_index,
            &self.archived_transactions,
            &self.archived_entries,
        );

        trees
            .transaction(|(txns, entries_tree, index_tree, archived_txns, archived_entries)| {
                if archive {
                    let archived_txn = ArchivedTransaction::from(txn);
                    let bytes = bincode::serialize(&archived_txn)
                        .expect("in-memory struct always encodes");
                    archived_txns.insert(txn.id.as_str(), bytes)?;

                    for entry in entries {
                        let archived_entry = ArchivedEntry::from(entry);
                        let bytes = bincode::serialize(&archived_entry)
                            .expect("in-memory struct always encodes");
                        archived_entries.insert(entry.id.as_str(), bytes)?;
                    }
                }

                txns.remove(txn.id.as_str())?;
                for entry in entries {
                    entries_tree.remove(entry.id.as_str())?;
                    index_tree.remove(entry.id.as_str())?;
                }
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError<sled::Error>| storage_err(e))?;

        tracing::info!(tx_id = %txn.id, archived = archive, "transaction trimmed");
        Ok(())
    }

    // ── Deleted-model tombstones ─────────────────────────────────────────────

    pub fn insert_deleted_model(
        &self,
        model_class: ModelClass,
        record_id: RecordId,
        record: &impl serde::Serialize,
    ) -> Result<(), LedgerError> {
        let tombstone = DeletedModel::new(model_class, record_id.clone(), record);
        self.deleted_models
            .insert(record_id.as_str(), encode(&tombstone)?)
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn get_deleted_model(&self, id: &RecordId) -> Result<Option<DeletedModel>, LedgerError> {
        match self.deleted_models.get(id.as_str()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

// delete_entry/delete_transaction are kept private: trim is the only
// caller, and it goes through the transactional path above. They remain
// as free methods rather than being folded into trim_transaction so a
// future direct-delete API (outside of trim) has somewhere to reuse them.
#[allow(dead_code)]
fn _keep_delete_helpers_reachable(db: &LedgerDb, id: &RecordId, txn: &Transaction) {
    let _ = db.delete_entry(id);
    let _ = db.delete_transaction(txn);
}
