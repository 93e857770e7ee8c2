use crate::enums::{AccountType, EntryType};
use crate::hashed::HashedRecord;
use crate::ids::RecordId;
use ledgerchain_codec::Value;
use ledgerchain_script::{Cache, Contracts, ScriptRuntime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A chart-of-accounts node. `locking_scripts` gates which entry directions
/// require authorization and what that authorization must satisfy.
/// `active` is excluded from the hash: it is a mutable flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: RecordId,
    pub name: String,
    pub account_type: AccountType,
    pub ledger_id: RecordId,
    pub parent_id: Option<RecordId>,
    pub code: Option<String>,
    pub locking_scripts: BTreeMap<EntryType, Vec<u8>>,
    pub category_id: Option<RecordId>,
    pub details: Value,
    pub active: bool,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        account_type: AccountType,
        ledger_id: RecordId,
        parent_id: Option<RecordId>,
        code: Option<String>,
    ) -> Self {
        let mut account = Account {
            id: RecordId::from_hex(""),
            name: name.into(),
            account_type,
            ledger_id,
            parent_id,
            code,
            locking_scripts: BTreeMap::new(),
            category_id: None,
            details: Value::Null,
            active: true,
        };
        account.id = account.generate_id();
        account
    }

    /// Checks `auth || locking_scripts[entry_type]` (missing locking script
    /// treated as empty bytes) against the script runtime. Never panics —
    /// a runtime that can't parse the combined bytes is a `false` verdict,
    /// matching the "swallow runtime errors as false" contract.
    pub fn validate_script(
        &self,
        entry_type: EntryType,
        auth_script: &[u8],
        runtime: &dyn ScriptRuntime,
        cache: &Cache,
        contracts: &Contracts,
    ) -> bool {
        let locking_script = self.locking_scripts.get(&entry_type).cloned().unwrap_or_default();
        let mut combined = auth_script.to_vec();
        combined.extend_from_slice(&locking_script);
        runtime.verify(&combined, cache, contracts)
    }
}

impl HashedRecord for Account {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut locking = BTreeMap::new();
        for (entry_type, bytes) in &self.locking_scripts {
            locking.insert(entry_type.code().to_string(), Value::Bytes(bytes.clone()));
        }
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::Str(self.name.clone()));
        m.insert("type".to_string(), Value::Str(self.account_type.code().to_string()));
        m.insert("ledger_id".to_string(), Value::Str(self.ledger_id.as_str().to_string()));
        m.insert(
            "parent_id".to_string(),
            match &self.parent_id {
                Some(id) => Value::Str(id.as_str().to_string()),
                None => Value::Null,
            },
        );
        m.insert(
            "code".to_string(),
            match &self.code {
                Some(c) => Value::Str(c.clone()),
                None => Value::Null,
            },
        );
        m.insert("locking_scripts".to_string(), Value::Map(locking));
        m.insert(
            "category_id".to_string(),
            match &self.category_id {
                Some(id) => Value::Str(id.as_str().to_string()),
                None => Value::Null,
            },
        );
        m.insert("details".to_string(), self.details.clone());
        m
    }
}

/// Walks `parent_id` links starting from `start` using `lookup`, failing if
/// the walk revisits a node — i.e. detects a cycle before it can corrupt
/// `balance()`'s recursion. `lookup` resolves an account ID to its parent.
pub fn has_parent_cycle(
    start: &RecordId,
    lookup: impl Fn(&RecordId) -> Option<RecordId>,
) -> bool {
    let mut seen = std::collections::HashSet::new();
    seen.insert(start.clone());
    let mut current = start.clone();
    while let Some(parent) = lookup(&current) {
        if !seen.insert(parent.clone()) {
            return true;
        }
        current = parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_locking_scripts_means_empty_bytes_lock() {
        let account = Account::new(
            "Equity",
            AccountType::Equity,
            RecordId::from_hex("ledger"),
            None,
            None,
        );
        struct AlwaysTrueRuntime;
        impl ScriptRuntime for AlwaysTrueRuntime {
            fn verify(&self, script_bytes: &[u8], _cache: &Cache, _contracts: &Contracts) -> bool {
                script_bytes.is_empty()
            }
        }
        assert!(account.validate_script(
            EntryType::Credit,
            &[],
            &AlwaysTrueRuntime,
            &Cache::new(),
            &Contracts::new()
        ));
    }

    #[test]
    fn detects_simple_cycle() {
        let a = RecordId::from_hex("a");
        let b = RecordId::from_hex("b");
        let lookup = move |id: &RecordId| {
            if *id == a { Some(b.clone()) } else if *id == b { Some(a.clone()) } else { None }
        };
        assert!(has_parent_cycle(&RecordId::from_hex("a"), lookup));
    }

    #[test]
    fn acyclic_chain_is_fine() {
        let root = RecordId::from_hex("root");
        let mid = RecordId::from_hex("mid");
        let leaf = RecordId::from_hex("leaf");
        let lookup = move |id: &RecordId| {
            if *id == leaf {
                Some(mid.clone())
            } else if *id == mid {
                Some(root.clone())
            } else {
                None
            }
        };
        assert!(!has_parent_cycle(&RecordId::from_hex("leaf"), lookup));
    }
}
