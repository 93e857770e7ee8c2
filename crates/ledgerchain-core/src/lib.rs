pub mod account;
pub mod archive;
pub mod correspondence;
pub mod currency;
pub mod entry;
pub mod enums;
pub mod error;
pub mod hashed;
pub mod identity;
pub mod ids;
pub mod ledger;
pub mod rollup;
pub mod transaction;

pub use account::Account;
pub use archive::{ArchivedEntry, ArchivedTransaction};
pub use correspondence::Correspondence;
pub use currency::Currency;
pub use entry::{random_nonce, Entry};
pub use enums::{AccountType, EntryType, LedgerType};
pub use error::LedgerError;
pub use hashed::HashedRecord;
pub use identity::Identity;
pub use ids::{Amount, RecordId, Timestamp};
pub use ledger::Ledger;
pub use rollup::TxRollup;
pub use transaction::Transaction;
