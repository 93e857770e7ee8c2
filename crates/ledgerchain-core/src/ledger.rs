use crate::account::Account;
use crate::enums::{AccountType, LedgerType};
use crate::hashed::HashedRecord;
use crate::ids::RecordId;
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scoping container owned by exactly one Identity; accounts and
/// transactions belong to a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: RecordId,
    pub name: String,
    pub ledger_type: LedgerType,
    pub identity_id: RecordId,
    pub currency_id: RecordId,
}

impl Ledger {
    pub fn new(
        name: impl Into<String>,
        ledger_type: LedgerType,
        identity_id: RecordId,
        currency_id: RecordId,
    ) -> Self {
        let mut ledger = Ledger {
            id: RecordId::from_hex(""),
            name: name.into(),
            ledger_type,
            identity_id,
            currency_id,
        };
        ledger.id = ledger.generate_id();
        ledger
    }

    /// Creates (unsaved) a minimal Asset/Liability/Equity chart of accounts,
    /// with the conventional `1xx`/`2xx`/`28x` codes.
    pub fn setup_basic_accounts(&self, owner_name: &str) -> [Account; 3] {
        let asset = Account::new(
            format!("General Asset ({owner_name})"),
            AccountType::Asset,
            self.id.clone(),
            None,
            Some("1xx".to_string()),
        );
        let liability = Account::new(
            format!("General Liability ({owner_name})"),
            AccountType::Liability,
            self.id.clone(),
            None,
            Some("2xx".to_string()),
        );
        let equity = Account::new(
            format!("General Equity ({owner_name})"),
            AccountType::Equity,
            self.id.clone(),
            None,
            Some("28x".to_string()),
        );
        [asset, liability, equity]
    }
}

impl HashedRecord for Ledger {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::Str(self.name.clone()));
        m.insert("type".to_string(), Value::Str(self.ledger_type.code().to_string()));
        m.insert("identity_id".to_string(), Value::Str(self.identity_id.as_str().to_string()));
        m.insert("currency_id".to_string(), Value::Str(self.currency_id.as_str().to_string()));
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_basic_accounts_uses_conventional_codes() {
        let ledger = Ledger::new(
            "Main",
            LedgerType::General,
            RecordId::from_hex("identity"),
            RecordId::from_hex("currency"),
        );
        let [asset, liability, equity] = ledger.setup_basic_accounts("Test Man");
        assert_eq!(asset.code.as_deref(), Some("1xx"));
        assert_eq!(liability.code.as_deref(), Some("2xx"));
        assert_eq!(equity.code.as_deref(), Some("28x"));
        assert_eq!(asset.account_type, AccountType::Asset);
    }
}
