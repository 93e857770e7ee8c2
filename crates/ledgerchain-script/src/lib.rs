//! A concrete binding of the script-runtime contract: opaque "locking" and
//! "auth" bytecode validated by a pure `verify` function. This binding
//! implements exactly the two lock kinds the ledger needs — a single
//! Schnorr/taproot-style pubkey lock, and an all-of-N multisig lock — not a
//! general opcode interpreter.

mod runtime;

pub use runtime::{
    make_multisig_auth, make_multisig_lock, make_pubkey_auth, make_pubkey_lock, ScriptRuntime,
    TaprootRuntime,
};

use std::collections::BTreeMap;

/// Byte-string keyed inputs fed to a script verifier: signature-check
/// opcodes read their message from `cache["sigfield1"]` and similar keys.
pub type Cache = BTreeMap<String, Vec<u8>>;
/// Named contract bytecode a script may reference; unused by the concrete
/// lock kinds implemented here but kept in the contract shape.
pub type Contracts = BTreeMap<String, Vec<u8>>;
