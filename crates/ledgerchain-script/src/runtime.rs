use crate::{Cache, Contracts};
use bitcoin::secp256k1::schnorr::Signature as SchnorrSignature;
use bitcoin::secp256k1::{Message, Secp256k1, XOnlyPublicKey};

const LOCK_SINGLE: u8 = 0x01;
const LOCK_MULTISIG: u8 = 0x02;
const AUTH_SINGLE: u8 = 0x01;
const AUTH_MULTISIG: u8 = 0x02;

const XONLY_LEN: usize = 32;
const SCHNORR_SIG_LEN: usize = 64;

/// The script runtime contract: must never throw. Internal errors surface
/// as `false`. Implementations must hold no mutable state across calls.
pub trait ScriptRuntime: Send + Sync {
    fn verify(&self, script_bytes: &[u8], cache: &Cache, contracts: &Contracts) -> bool;
}

/// A taproot-style script runtime: single-pubkey Schnorr signature checks
/// and all-of-N multisig, over a locking-script/auth-script byte encoding
/// private to this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaprootRuntime;

impl ScriptRuntime for TaprootRuntime {
    fn verify(&self, script_bytes: &[u8], cache: &Cache, _contracts: &Contracts) -> bool {
        verify_inner(script_bytes, cache).unwrap_or(false)
    }
}

fn verify_inner(script_bytes: &[u8], cache: &Cache) -> Option<bool> {
    let message_bytes = cache.get("sigfield1")?;
    let message = Message::from_digest_slice(pad_or_truncate_32(message_bytes).as_slice()).ok()?;
    let secp = Secp256k1::verification_only();

    let (auth_sigs, rest) = parse_auth(script_bytes)?;
    let pubkeys = parse_lock(rest)?;

    match (auth_sigs.len(), pubkeys.len()) {
        (1, 1) => {
            let sig = auth_sigs[0].as_ref()?;
            Some(secp.verify_schnorr(sig, &message, &pubkeys[0]).is_ok())
        }
        (n, m) if n == m && n > 0 => {
            let threshold = m;
            let valid = auth_sigs
                .iter()
                .zip(pubkeys.iter())
                .filter(|(sig, pk)| {
                    sig.as_ref()
                        .map(|s| secp.verify_schnorr(s, &message, pk).is_ok())
                        .unwrap_or(false)
                })
                .count();
            Some(valid >= threshold)
        }
        _ => Some(false),
    }
}

fn pad_or_truncate_32(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let n = bytes.len().min(32);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Parses the auth-script prefix, returning the per-signature slots
/// (`None` for an unsigned slot in a partially-filled multisig) and the
/// remaining bytes, which are the locking script.
fn parse_auth(bytes: &[u8]) -> Option<(Vec<Option<SchnorrSignature>>, &[u8])> {
    let (&tag, rest) = bytes.split_first()?;
    match tag {
        AUTH_SINGLE => {
            if rest.len() < SCHNORR_SIG_LEN {
                return None;
            }
            let (sig_bytes, rest) = rest.split_at(SCHNORR_SIG_LEN);
            Some((vec![parse_sig_slot(sig_bytes)], rest))
        }
        AUTH_MULTISIG => {
            let (&count, rest) = rest.split_first()?;
            let count = count as usize;
            if rest.len() < count * SCHNORR_SIG_LEN {
                return None;
            }
            let mut sigs = Vec::with_capacity(count);
            let mut remaining = rest;
            for _ in 0..count {
                let (sig_bytes, next) = remaining.split_at(SCHNORR_SIG_LEN);
                sigs.push(parse_sig_slot(sig_bytes));
                remaining = next;
            }
            Some((sigs, remaining))
        }
        _ => None,
    }
}

fn parse_sig_slot(bytes: &[u8]) -> Option<SchnorrSignature> {
    if bytes.iter().all(|b| *b == 0) {
        return None;
    }
    SchnorrSignature::from_slice(bytes).ok()
}

fn parse_lock(bytes: &[u8]) -> Option<Vec<XOnlyPublicKey>> {
    let (&tag, rest) = bytes.split_first()?;
    match tag {
        LOCK_SINGLE => {
            if rest.len() < XONLY_LEN {
                return None;
            }
            let pk = XOnlyPublicKey::from_slice(&rest[..XONLY_LEN]).ok()?;
            Some(vec![pk])
        }
        LOCK_MULTISIG => {
            let (&_threshold, rest) = rest.split_first()?;
            let (&n, rest) = rest.split_first()?;
            let n = n as usize;
            if rest.len() < n * XONLY_LEN {
                return None;
            }
            let mut pubkeys = Vec::with_capacity(n);
            let mut remaining = rest;
            for _ in 0..n {
                let (pk_bytes, next) = remaining.split_at(XONLY_LEN);
                pubkeys.push(XOnlyPublicKey::from_slice(pk_bytes).ok()?);
                remaining = next;
            }
            Some(pubkeys)
        }
        _ => None,
    }
}

/// Builds a single-pubkey lock: "only a Schnorr signature by this key may
/// authorize."
pub fn make_pubkey_lock(pubkey: &XOnlyPublicKey) -> Vec<u8> {
    let mut out = vec![LOCK_SINGLE];
    out.extend_from_slice(&pubkey.serialize());
    out
}

/// Builds an all-of-N multisig lock over the given pubkeys (order matters:
/// auth signatures must be supplied in the same order, with zero-filled
/// slots for keys that didn't sign).
pub fn make_multisig_lock(pubkeys: &[XOnlyPublicKey]) -> Vec<u8> {
    let mut out = vec![LOCK_MULTISIG, pubkeys.len() as u8, pubkeys.len() as u8];
    for pk in pubkeys {
        out.extend_from_slice(&pk.serialize());
    }
    out
}

/// Builds a single-signature auth script.
pub fn make_pubkey_auth(sig: &SchnorrSignature) -> Vec<u8> {
    let mut out = vec![AUTH_SINGLE];
    out.extend_from_slice(sig.as_ref());
    out
}

/// Builds a multisig auth script with one slot per pubkey in the
/// corresponding lock; `sigs[i] = None` leaves that slot unsigned.
pub fn make_multisig_auth(sigs: &[Option<SchnorrSignature>]) -> Vec<u8> {
    let mut out = vec![AUTH_MULTISIG, sigs.len() as u8];
    for sig in sigs {
        match sig {
            Some(s) => out.extend_from_slice(s.as_ref()),
            None => out.extend_from_slice(&[0u8; SCHNORR_SIG_LEN]),
        }
    }
    out
}
