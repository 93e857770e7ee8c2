mod config;
mod db;
mod tombstone;

pub use config::LedgerConfig;
pub use db::LedgerDb;
pub use tombstone::{DeletedModel, ModelClass};

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchain_codec::Value;
    use ledgerchain_core::{Account, AccountType, Currency, Identity, Ledger, LedgerType};
    use std::collections::BTreeMap;

    fn temp_db() -> LedgerDb {
        LedgerDb::open_temporary().expect("open temporary db")
    }

    fn temp_identity(name: &str) -> Identity {
        Identity::new(name, Value::Null, None)
    }

    fn temp_currency() -> Currency {
        Currency::new("US Dollar", "$", "USD", 100, 2, Value::Null).unwrap()
    }

    #[test]
    fn round_trips_an_identity() {
        let db = temp_db();
        let identity = temp_identity("alice");
        db.put_identity(&identity).unwrap();
        let loaded = db.get_identity(&identity.id).unwrap().unwrap();
        assert_eq!(loaded.id, identity.id);
        assert_eq!(loaded.name, "alice");
    }

    #[test]
    fn finds_children_by_parent_id() {
        let db = temp_db();
        let identity = temp_identity("bob");
        let currency = temp_currency();
        let ledger = Ledger::new("bob's ledger", LedgerType::General, identity.id.clone(), currency.id.clone());
        let parent = Account::new("assets", AccountType::Asset, ledger.id.clone(), None, Some("1".into()));
        let child = Account::new(
            "cash",
            AccountType::Asset,
            ledger.id.clone(),
            Some(parent.id.clone()),
            Some("1.1".into()),
        );
        db.put_account(&parent).unwrap();
        db.put_account(&child).unwrap();

        let children = db.children_of(&parent.id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }

    #[test]
    fn entry_txn_index_tracks_containment() {
        use ledgerchain_core::{Entry, EntryType, Timestamp, Transaction};

        let db = temp_db();
        let identity = temp_identity("carol");
        let currency = temp_currency();
        let ledger = Ledger::new("carol's ledger", LedgerType::General, identity.id.clone(), currency.id.clone());
        let account = Account::new("cash", AccountType::Asset, ledger.id.clone(), None, Some("1".into()));
        let entry = Entry::new(EntryType::Debit, 100, b"n1".to_vec(), account.id.clone(), Value::Null);
        db.put_entry(&entry).unwrap();
        assert!(db.transaction_containing_entry(&entry.id).unwrap().is_none());

        let txn = Transaction::assemble(
            vec![entry.id.clone()],
            vec![ledger.id.clone()],
            Timestamp::new("now"),
            Value::Null,
            BTreeMap::new(),
        );
        db.put_transaction(&txn).unwrap();

        let owner = db.transaction_containing_entry(&entry.id).unwrap();
        assert_eq!(owner, Some(txn.id.clone()));
    }

    #[test]
    fn trim_transaction_archives_and_removes() {
        use ledgerchain_core::{Entry, EntryType, Timestamp, Transaction};

        let db = temp_db();
        let identity = temp_identity("dana");
        let currency = temp_currency();
        let ledger = Ledger::new("dana's ledger", LedgerType::General, identity.id.clone(), currency.id.clone());
        let account = Account::new("cash", AccountType::Asset, ledger.id.clone(), None, Some("1".into()));
        let entry = Entry::new(EntryType::Debit, 50, b"n2".to_vec(), account.id.clone(), Value::Null);
        let txn = Transaction::assemble(
            vec![entry.id.clone()],
            vec![ledger.id.clone()],
            Timestamp::new("now"),
            Value::Null,
            BTreeMap::new(),
        );
        db.put_entry(&entry).unwrap();
        db.put_transaction(&txn).unwrap();

        db.trim_transaction(&txn, std::slice::from_ref(&entry), true).unwrap();

        assert!(db.get_transaction(&txn.id).unwrap().is_none());
        assert!(db.get_entry(&entry.id).unwrap().is_none());
        assert!(db.transaction_containing_entry(&entry.id).unwrap().is_none());
        assert!(db.get_archived_transaction(&txn.id).unwrap().is_some());
        assert!(db.get_archived_entry(&entry.id).unwrap().is_some());
    }

    #[test]
    fn trim_transaction_without_archive_leaves_tombstones() {
        use ledgerchain_core::{Entry, EntryType, Timestamp, Transaction};

        let db = temp_db();
        let identity = temp_identity("erin");
        let currency = temp_currency();
        let ledger = Ledger::new("erin's ledger", LedgerType::General, identity.id.clone(), currency.id.clone());
        let account = Account::new("cash", AccountType::Asset, ledger.id.clone(), None, Some("1".into()));
        let entry = Entry::new(EntryType::Debit, 75, b"n3".to_vec(), account.id.clone(), Value::Null);
        let txn = Transaction::assemble(
            vec![entry.id.clone()],
            vec![ledger.id.clone()],
            Timestamp::new("now"),
            Value::Null,
            BTreeMap::new(),
        );
        db.put_entry(&entry).unwrap();
        db.put_transaction(&txn).unwrap();

        db.trim_transaction(&txn, std::slice::from_ref(&entry), false).unwrap();

        assert!(db.get_transaction(&txn.id).unwrap().is_none());
        assert!(db.get_entry(&entry.id).unwrap().is_none());
        assert!(db.get_archived_transaction(&txn.id).unwrap().is_none());
        assert!(db.get_archived_entry(&entry.id).unwrap().is_none());

        let txn_tombstone = db.get_deleted_model(&txn.id).unwrap().unwrap();
        assert_eq!(txn_tombstone.model_class, ModelClass::Transaction);
        assert_eq!(txn_tombstone.restore_as::<Transaction>().unwrap().id, txn.id);

        let entry_tombstone = db.get_deleted_model(&entry.id).unwrap().unwrap();
        assert_eq!(entry_tombstone.model_class, ModelClass::Entry);
        assert_eq!(entry_tombstone.restore_as::<Entry>().unwrap().id, entry.id);
    }
}
