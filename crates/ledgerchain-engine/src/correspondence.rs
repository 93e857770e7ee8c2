use ledgerchain_core::{Account, AccountType, LedgerError, RecordId};
use ledgerchain_storage::LedgerDb;
use std::collections::BTreeSet;

/// Discovers the nostro/vostro account pair(s) a bilateral correspondence
/// surfaces, by the substring-matching convention the testable properties
/// are phrased against: an account's `name` contains one of the two
/// identity IDs.
pub struct CorrespondenceService<'a> {
    db: &'a LedgerDb,
}

impl<'a> CorrespondenceService<'a> {
    pub fn new(db: &'a LedgerDb) -> Self {
        Self { db }
    }

    pub fn get_accounts(
        &self,
        identity_a: &RecordId,
        identity_b: &RecordId,
    ) -> Result<Vec<Account>, LedgerError> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for identity_id in [identity_a, identity_b] {
            for account in self.db.accounts_where_name_contains(identity_id.as_str())? {
                if matches!(account.account_type, AccountType::Asset | AccountType::Liability)
                    && seen.insert(account.id.clone())
                {
                    out.push(account);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerchain_codec::Value;
    use ledgerchain_core::{Currency, Identity, Ledger, LedgerType};

    #[test]
    fn finds_accounts_named_after_either_identity() {
        let db = LedgerDb::open_temporary().unwrap();
        let alice = Identity::new("alice", Value::Null, None);
        let bob = Identity::new("bob", Value::Null, None);
        let currency = Currency::new("US Dollar", "$", "USD", 100, 2, Value::Null).unwrap();
        let ledger = Ledger::new("books", LedgerType::General, alice.id.clone(), currency.id.clone());

        let nostro = Account::new(
            format!("Nostro ({})", bob.id.as_str()),
            AccountType::Asset,
            ledger.id.clone(),
            None,
            None,
        );
        let unrelated = Account::new("Rent Expense", AccountType::Asset, ledger.id.clone(), None, None);
        db.put_account(&nostro).unwrap();
        db.put_account(&unrelated).unwrap();

        let service = CorrespondenceService::new(&db);
        let accounts = service.get_accounts(&alice.id, &bob.id).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, nostro.id);
    }
}
