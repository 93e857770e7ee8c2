use ledgerchain_core::{Amount, EntryType, LedgerError, RecordId};
use ledgerchain_storage::LedgerDb;
use std::collections::BTreeMap;

/// Computes a signed account balance by summing persisted entries and,
/// optionally, recursing into sub-accounts.
pub struct AccountBalanceEngine<'a> {
    db: &'a LedgerDb,
}

impl<'a> AccountBalanceEngine<'a> {
    pub fn new(db: &'a LedgerDb) -> Self {
        Self { db }
    }

    /// `rolled_up` seeds the running totals for an account whose prior
    /// entries have already been rolled up and trimmed — its one entry in
    /// the map stands in for the entries that were archived.
    pub fn balance(
        &self,
        account_id: &RecordId,
        include_sub: bool,
        rolled_up: &BTreeMap<RecordId, (EntryType, Amount)>,
    ) -> Result<Amount, LedgerError> {
        let account = self
            .db
            .get_account(account_id)?
            .ok_or_else(|| LedgerError::value_error(format!("unknown account {account_id}")))?;

        let mut credit_total: Amount = 0;
        let mut debit_total: Amount = 0;

        if let Some((entry_type, amount)) = rolled_up.get(account_id) {
            match entry_type {
                EntryType::Credit => credit_total += amount,
                EntryType::Debit => debit_total += amount,
            }
        }

        for chunk in self.db.entries_for_account(account_id)?.chunks(500) {
            for entry in chunk {
                match entry.entry_type {
                    EntryType::Credit => credit_total += entry.amount,
                    EntryType::Debit => debit_total += entry.amount,
                }
            }
        }

        let mut total = if account.account_type.is_debit_positive() {
            debit_total - credit_total
        } else {
            credit_total - debit_total
        };

        if include_sub {
            for child in self.db.children_of(account_id)? {
                total += self.balance(&child.id, true, rolled_up)?;
            }
        }

        Ok(total)
    }

    /// Signed balance per top-level account in `ledger_id` (`parent_id ==
    /// None`), non-recursive — a sub-account's balance is reported under
    /// its own top-level ancestor, not listed separately.
    pub fn balances(&self, ledger_id: &RecordId) -> Result<BTreeMap<RecordId, Amount>, LedgerError> {
        let mut out = BTreeMap::new();
        for account in self.db.accounts_for_ledger(ledger_id)? {
            if account.parent_id.is_none() {
                let amount = self.balance(&account.id, true, &BTreeMap::new())?;
                out.insert(account.id, amount);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchain_codec::Value;
    use ledgerchain_core::{Account, AccountType, Currency, Entry, Identity, Ledger, LedgerType};

    fn temp_db() -> LedgerDb {
        LedgerDb::open_temporary().expect("open temporary db")
    }

    #[test]
    fn account_with_no_entries_has_zero_balance() {
        let db = temp_db();
        let identity = Identity::new("tester", Value::Null, None);
        let currency = Currency::new("US Dollar", "$", "USD", 100, 2, Value::Null).unwrap();
        let ledger = Ledger::new("books", LedgerType::General, identity.id.clone(), currency.id.clone());
        let account = Account::new("cash", AccountType::Asset, ledger.id.clone(), None, None);
        db.put_account(&account).unwrap();

        let engine = AccountBalanceEngine::new(&db);
        let balance = engine.balance(&account.id, true, &BTreeMap::new()).unwrap();
        assert_eq!(balance, 0);
    }

    #[test]
    fn sub_account_rolls_up_into_parent() {
        let db = temp_db();
        let identity = Identity::new("tester", Value::Null, None);
        let currency = Currency::new("US Dollar", "$", "USD", 100, 2, Value::Null).unwrap();
        let ledger = Ledger::new("books", LedgerType::General, identity.id.clone(), currency.id.clone());
        let parent = Account::new("liability", AccountType::Liability, ledger.id.clone(), None, None);
        let child = Account::new(
            "liability sub",
            AccountType::Liability,
            ledger.id.clone(),
            Some(parent.id.clone()),
            None,
        );
        db.put_account(&parent).unwrap();
        db.put_account(&child).unwrap();

        let entry = Entry::new(EntryType::Credit, 999, b"n".to_vec(), child.id.clone(), Value::Null);
        db.put_entry(&entry).unwrap();

        let engine = AccountBalanceEngine::new(&db);
        assert_eq!(engine.balance(&child.id, true, &BTreeMap::new()).unwrap(), 999);
        assert_eq!(engine.balance(&parent.id, false, &BTreeMap::new()).unwrap(), 0);
        assert_eq!(engine.balance(&parent.id, true, &BTreeMap::new()).unwrap(), 999);
    }

    #[test]
    fn balances_aggregates_top_level_accounts_only() {
        let db = temp_db();
        let identity = Identity::new("tester", Value::Null, None);
        let currency = Currency::new("US Dollar", "$", "USD", 100, 2, Value::Null).unwrap();
        let ledger = Ledger::new("books", LedgerType::General, identity.id.clone(), currency.id.clone());
        let parent = Account::new("liability", AccountType::Liability, ledger.id.clone(), None, None);
        let child = Account::new(
            "liability sub",
            AccountType::Liability,
            ledger.id.clone(),
            Some(parent.id.clone()),
            None,
        );
        db.put_account(&parent).unwrap();
        db.put_account(&child).unwrap();
        let entry = Entry::new(EntryType::Credit, 500, b"n".to_vec(), child.id.clone(), Value::Null);
        db.put_entry(&entry).unwrap();

        let engine = AccountBalanceEngine::new(&db);
        let balances = engine.balances(&ledger.id).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances.get(&parent.id), Some(&500));
        assert!(!balances.contains_key(&child.id));
    }
}
