use crate::hashed::HashedRecord;
use crate::ids::RecordId;
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An owner of ledgers. `seed` and `secret_details` are excluded from the
/// hash: they are the only fields in the whole data model that can be
/// mutated in place without invalidating the record's ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: RecordId,
    pub name: String,
    pub details: Value,
    pub pubkey: Option<Vec<u8>>,
    pub seed: Option<Vec<u8>>,
    pub secret_details: Option<Value>,
}

impl Identity {
    pub fn new(name: impl Into<String>, details: Value, pubkey: Option<Vec<u8>>) -> Self {
        let mut identity = Identity {
            id: RecordId::from_hex(""),
            name: name.into(),
            details,
            pubkey,
            seed: None,
            secret_details: None,
        };
        identity.id = identity.generate_id();
        identity
    }

    /// Updates `seed` in place. Does not change `id`.
    pub fn set_seed(&mut self, seed: Option<Vec<u8>>) {
        self.seed = seed;
    }

    /// Updates `secret_details` in place. Does not change `id`.
    pub fn set_secret_details(&mut self, secret_details: Option<Value>) {
        self.secret_details = secret_details;
    }
}

impl HashedRecord for Identity {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::Str(self.name.clone()));
        m.insert("details".to_string(), self.details.clone());
        m.insert(
            "pubkey".to_string(),
            match &self.pubkey {
                Some(pk) => Value::Bytes(pk.clone()),
                None => Value::Null,
            },
        );
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutating_seed_does_not_change_id() {
        let mut identity = Identity::new("Test Man", Value::Null, None);
        let id_before = identity.id.clone();
        identity.set_seed(Some(vec![1, 2, 3]));
        identity.set_secret_details(Some(Value::Str("shh".into())));
        assert_eq!(identity.id, id_before);
        assert!(identity.id_is_valid());
    }

    #[test]
    fn mutating_name_invalidates_the_old_id() {
        let identity = Identity::new("Test Man", Value::Null, None);
        let mut mutated = identity.clone();
        mutated.name = "Someone Else".to_string();
        assert_ne!(mutated.generate_id(), identity.id);
    }
}
