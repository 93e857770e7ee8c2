use crate::hashed::HashedRecord;
use crate::ids::RecordId;
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A bilateral agreement between exactly two identities. `details` may
/// carry a `txru_lock` script requiring joint authorization of rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correspondence {
    pub id: RecordId,
    pub identity_ids: [RecordId; 2],
    pub details: Value,
    pub ledger_ids: Vec<RecordId>,
}

impl Correspondence {
    pub fn new(identity_a: RecordId, identity_b: RecordId, details: Value, ledger_ids: Vec<RecordId>) -> Self {
        let mut ids = [identity_a, identity_b];
        ids.sort();
        let mut correspondence = Correspondence {
            id: RecordId::from_hex(""),
            identity_ids: ids,
            details,
            ledger_ids,
        };
        correspondence.id = correspondence.generate_id();
        correspondence
    }

    /// The `txru_lock` locking script from `details`, if one is set.
    pub fn txru_lock(&self) -> Option<Vec<u8>> {
        match &self.details {
            Value::Map(m) => match m.get("txru_lock") {
                Some(Value::Bytes(b)) => Some(b.clone()),
                _ => None,
            },
            _ => None,
        }
    }
}

impl HashedRecord for Correspondence {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let identity_ids_csv = format!(
            "{},{}",
            self.identity_ids[0].as_str(),
            self.identity_ids[1].as_str()
        );
        let mut m = BTreeMap::new();
        m.insert("identity_ids".to_string(), Value::Str(identity_ids_csv));
        m.insert("details".to_string(), self.details.clone());
        m.insert(
            "ledger_ids".to_string(),
            Value::List(self.ledger_ids.iter().map(|id| Value::Str(id.as_str().to_string())).collect()),
        );
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ids_are_order_independent() {
        let a = RecordId::from_hex("aaa");
        let b = RecordId::from_hex("bbb");
        let c1 = Correspondence::new(a.clone(), b.clone(), Value::Null, vec![]);
        let c2 = Correspondence::new(b, a, Value::Null, vec![]);
        assert_eq!(c1.id, c2.id);
    }

    #[test]
    fn txru_lock_reads_from_details() {
        let mut details = BTreeMap::new();
        details.insert("txru_lock".to_string(), Value::Bytes(vec![9, 9]));
        let c = Correspondence::new(
            RecordId::from_hex("a"),
            RecordId::from_hex("b"),
            Value::Map(details),
            vec![],
        );
        assert_eq!(c.txru_lock(), Some(vec![9, 9]));
    }
}
