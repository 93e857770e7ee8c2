use crate::error::LedgerError;
use crate::hashed::HashedRecord;
use crate::ids::{Amount, RecordId};
use ledgerchain_codec::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A currency of account: fixes the base and number of minor-unit decimals
/// used to format an integer amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub id: RecordId,
    pub name: String,
    pub prefix_symbol: String,
    pub fx_symbol: String,
    pub base: u32,
    pub decimals: u32,
    pub details: Value,
}

impl Currency {
    pub fn new(
        name: impl Into<String>,
        prefix_symbol: impl Into<String>,
        fx_symbol: impl Into<String>,
        base: u32,
        decimals: u32,
        details: Value,
    ) -> Result<Self, LedgerError> {
        if base < 2 {
            return Err(LedgerError::value_error("currency base must be >= 2"));
        }
        let mut currency = Currency {
            id: RecordId::from_hex(""),
            name: name.into(),
            prefix_symbol: prefix_symbol.into(),
            fx_symbol: fx_symbol.into(),
            base,
            decimals,
            details,
        };
        currency.id = currency.generate_id();
        Ok(currency)
    }

    /// `(whole_units, remainder)` for an amount in this currency's minor unit.
    pub fn get_units_and_change(&self, amount: Amount) -> (i64, i64) {
        let scale = (self.base as i64).pow(self.decimals);
        (amount / scale, amount.rem_euclid(scale))
    }

    /// Formats an amount as `prefix + whole + "." + change` padded to
    /// `decimals` digits in the currency's base.
    pub fn format_amount(&self, amount: Amount) -> String {
        let (whole, change) = self.get_units_and_change(amount);
        if self.decimals == 0 {
            return format!("{}{}", self.prefix_symbol, whole);
        }
        let change_str = to_radix(change, self.base, self.decimals as usize);
        format!("{}{}.{}", self.prefix_symbol, whole, change_str)
    }
}

fn to_radix(mut value: i64, base: u32, width: usize) -> String {
    let digits = "0123456789abcdefghijklmnopqrstuvwxyz".as_bytes();
    let mut out = Vec::with_capacity(width);
    if value == 0 {
        out.push(b'0');
    }
    while value > 0 {
        let digit = (value % base as i64) as usize;
        out.push(digits[digit]);
        value /= base as i64;
    }
    while out.len() < width {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8(out).expect("digit alphabet is ascii")
}

impl HashedRecord for Currency {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn hashed_fields(&self) -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert("name".to_string(), Value::Str(self.name.clone()));
        m.insert("prefix_symbol".to_string(), Value::Str(self.prefix_symbol.clone()));
        m.insert("fx_symbol".to_string(), Value::Str(self.fx_symbol.clone()));
        m.insert("base".to_string(), Value::Int(self.base as i64));
        m.insert("decimals".to_string(), Value::Int(self.decimals as i64));
        m.insert("details".to_string(), self.details.clone());
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_usd_cents() {
        let usd = Currency::new("US Dollar", "$", "USD", 10, 2, Value::Null).unwrap();
        assert_eq!(usd.format_amount(1_000_000), "$10000.00");
        assert_eq!(usd.format_amount(5), "$0.05");
    }

    #[test]
    fn rejects_base_below_two() {
        assert!(matches!(
            Currency::new("x", "", "", 1, 2, Value::Null),
            Err(LedgerError::ValueError(_))
        ));
    }
}
