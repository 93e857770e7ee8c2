use serde::{Deserialize, Serialize};

/// The accounting classification of an Account, which fixes its sign
/// convention in `Account::balance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Asset,
    DebitBalance,
    ContraLiability,
    ContraEquity,
    NostroAsset,
    Liability,
    Equity,
    CreditBalance,
    ContraAsset,
    VostroLiability,
}

impl AccountType {
    /// Scalar code stored on disk in place of the enum variant.
    pub fn code(self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::DebitBalance => "debit_balance",
            AccountType::ContraLiability => "contra_liability",
            AccountType::ContraEquity => "contra_equity",
            AccountType::NostroAsset => "nostro_asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::CreditBalance => "credit_balance",
            AccountType::ContraAsset => "contra_asset",
            AccountType::VostroLiability => "vostro_liability",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "asset" => AccountType::Asset,
            "debit_balance" => AccountType::DebitBalance,
            "contra_liability" => AccountType::ContraLiability,
            "contra_equity" => AccountType::ContraEquity,
            "nostro_asset" => AccountType::NostroAsset,
            "liability" => AccountType::Liability,
            "equity" => AccountType::Equity,
            "credit_balance" => AccountType::CreditBalance,
            "contra_asset" => AccountType::ContraAsset,
            "vostro_liability" => AccountType::VostroLiability,
            _ => return None,
        })
    }

    /// Debit-positive account types return `debit - credit` from `balance()`;
    /// all others (credit-positive) return `credit - debit`.
    pub fn is_debit_positive(self) -> bool {
        matches!(
            self,
            AccountType::Asset
                | AccountType::DebitBalance
                | AccountType::ContraLiability
                | AccountType::ContraEquity
                | AccountType::NostroAsset
        )
    }
}

/// The direction of a single-sided posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Credit,
    Debit,
}

impl EntryType {
    /// Single-char scalar code, per the canonical storage form.
    pub fn code(self) -> char {
        match self {
            EntryType::Credit => 'c',
            EntryType::Debit => 'd',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'c' => Some(EntryType::Credit),
            'd' => Some(EntryType::Debit),
            _ => None,
        }
    }
}

/// The scope a Ledger plays within its owning Identity's books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerType {
    /// A normal, single-identity general ledger.
    General,
    /// An identity's nostro-side ledger within a Correspondence.
    Nostro,
    /// An identity's vostro-side ledger within a Correspondence.
    Vostro,
}

impl LedgerType {
    pub fn code(self) -> &'static str {
        match self {
            LedgerType::General => "general",
            LedgerType::Nostro => "nostro",
            LedgerType::Vostro => "vostro",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "general" => LedgerType::General,
            "nostro" => LedgerType::Nostro,
            "vostro" => LedgerType::Vostro,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_sign_classes_match_spec() {
        for t in [
            AccountType::Asset,
            AccountType::DebitBalance,
            AccountType::ContraLiability,
            AccountType::ContraEquity,
            AccountType::NostroAsset,
        ] {
            assert!(t.is_debit_positive());
        }
        for t in [
            AccountType::Liability,
            AccountType::Equity,
            AccountType::CreditBalance,
            AccountType::ContraAsset,
            AccountType::VostroLiability,
        ] {
            assert!(!t.is_debit_positive());
        }
    }

    #[test]
    fn entry_type_code_round_trips() {
        assert_eq!(EntryType::from_code(EntryType::Credit.code()), Some(EntryType::Credit));
        assert_eq!(EntryType::from_code(EntryType::Debit.code()), Some(EntryType::Debit));
    }
}
