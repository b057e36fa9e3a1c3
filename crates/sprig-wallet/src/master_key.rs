//! Master key provisioning and loading.
//!
//! The root of the shared tree is a BIP-32 extended private key derived from
//! a BIP-39 mnemonic. It is stored base58-encoded in a single file whose
//! existence is the only signal that the node has been initialized.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use bip39::{Language, Mnemonic};
use bitcoin::bip32::{ChildNumber, Xpriv};
use bitcoin::secp256k1::{All, Secp256k1};
use bitcoin::NetworkKind;
use tracing::{debug, info};
use zeroize::Zeroizing;

use sprig_core::types::DerivationPath;

use crate::error::KeyError;

/// Root key material of the shared HD tree.
pub struct MasterKey {
    xpriv: Xpriv,
    secp: Secp256k1<All>,
}

impl MasterKey {
    /// Derive the root key from a mnemonic without touching the filesystem.
    ///
    /// Normalizes whitespace and case before validation. The seed uses an
    /// empty passphrase.
    pub fn from_mnemonic(phrase: &str, network: NetworkKind) -> Result<Self, KeyError> {
        let normalized = phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let mnemonic = Mnemonic::parse_in(Language::English, &normalized)
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        let seed = Zeroizing::new(mnemonic.to_seed(""));
        let xpriv = Xpriv::new_master(network, &seed[..])
            .map_err(|e| KeyError::Derivation(e.to_string()))?;
        Ok(Self::from_xpriv(xpriv))
    }

    fn from_xpriv(xpriv: Xpriv) -> Self {
        Self {
            xpriv,
            secp: Secp256k1::new(),
        }
    }

    /// Derive the extended key at an unhardened path.
    pub fn derive(&self, path: &DerivationPath) -> Result<Xpriv, KeyError> {
        let children = path
            .segments()
            .iter()
            .map(|&index| {
                ChildNumber::from_normal_idx(index)
                    .map_err(|e| KeyError::Derivation(format!("{path}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.xpriv
            .derive_priv(&self.secp, &children)
            .map_err(|e| KeyError::Derivation(e.to_string()))
    }

    /// Network kind the root key was created for.
    pub fn network(&self) -> NetworkKind {
        self.xpriv.network
    }

    /// Signing context shared by every key derived from this root.
    pub fn secp(&self) -> &Secp256k1<All> {
        &self.secp
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("network", &self.xpriv.network)
            .field("xpriv", &"[REDACTED]")
            .finish()
    }
}

/// Load the master key from `path`.
///
/// Fails with [`KeyError::NotInitialized`] when the file does not exist.
pub fn load(path: &Path) -> Result<MasterKey, KeyError> {
    if !path.exists() {
        return Err(KeyError::NotInitialized(path.display().to_string()));
    }
    let contents = Zeroizing::new(fs::read_to_string(path).map_err(|e| KeyError::Io(e.to_string()))?);
    let xpriv = Xpriv::from_str(contents.trim())
        .map_err(|e| KeyError::CorruptedKeyFile(e.to_string()))?;
    debug!(path = %path.display(), "master key loaded");
    Ok(MasterKey::from_xpriv(xpriv))
}

/// Derive the master key from `phrase` and write it to `path`.
///
/// Nothing is written if the mnemonic is invalid. An existing file is
/// overwritten. A failed write leaves the node uninitialized; there is no
/// partial-write recovery.
pub fn provision(phrase: &str, network: NetworkKind, path: &Path) -> Result<MasterKey, KeyError> {
    let key = MasterKey::from_mnemonic(phrase, network)?;
    let encoded = Zeroizing::new(key.xpriv.to_string());
    fs::write(path, encoded.as_bytes()).map_err(|e| KeyError::Io(e.to_string()))?;
    info!(path = %path.display(), "master key provisioned");
    Ok(key)
}

/// Generate a fresh English mnemonic with 12 or 24 words.
pub fn generate_mnemonic(words: usize) -> Result<String, KeyError> {
    use rand::RngCore;

    let entropy_len = match words {
        12 => 16,
        24 => 32,
        _ => return Err(KeyError::InvalidWordCount(words)),
    };
    let mut entropy = Zeroizing::new(vec![0u8; entropy_len]);
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}
