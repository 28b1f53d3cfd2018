use std::path::PathBuf;

use anyhow::Context;
use cipher::rsa::{verify_pss, verify_pss_auto, PublicKey, SaltLength};
use cipher::CipherError;
use clap::Args;
use crypto_hash::HashKind;

use super::{KeyFile, PssConfig};
use crate::error::RsaPssError;
use crate::log_error;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// the JSON key file contains `n` and `e`
    #[arg(short, long)]
    key: PathBuf,

    /// the signed file
    #[arg(short, long)]
    file: PathBuf,

    /// the raw signature file, or the hex signature with `--hex`
    #[arg(short, long)]
    signature: String,

    /// treat `--signature` as a hex string
    #[arg(long)]
    hex: bool,

    /// the message digest algorithm, overrides the configuration
    #[arg(long)]
    hash: Option<HashKind>,

    /// `auto`, `hash` or the salt length in bytes, overrides the configuration
    #[arg(long)]
    salt_len: Option<SaltLength>,
}

/// `SaltLength::Auto`时从编码消息中恢复盐的长度
pub fn verify_message(
    key: &PublicKey,
    hash: HashKind,
    salt_len: SaltLength,
    msg: &[u8],
    sig: &[u8],
) -> Result<(), CipherError> {
    let (mut hasher, hashed) = (hash.hasher(), hash.digest(msg));

    match salt_len {
        SaltLength::Auto => verify_pss_auto(key, &mut *hasher, &hashed, sig),
        SaltLength::EqualsHash => {
            verify_pss(key, &mut *hasher, &hashed, sig, hash.output_len())
        }
        SaltLength::Fixed(s_len) => verify_pss(key, &mut *hasher, &hashed, sig, s_len),
    }
}

impl VerifyArgs {
    pub fn exe(self, config: &PssConfig) -> bool {
        log_error(self.run(config)).unwrap_or(false)
    }

    fn signature(&self) -> anyhow::Result<Vec<u8>> {
        if self.hex {
            let s = self.signature.trim();
            let s = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(s).map_err(|e| RsaPssError::InvalidSignature(e.to_string()).into())
        } else {
            std::fs::read(&self.signature)
                .with_context(|| format!("read the signature `{}` failed", self.signature))
        }
    }

    fn run(self, config: &PssConfig) -> anyhow::Result<bool> {
        let key = KeyFile::open(&self.key)?.public_key()?;
        let msg = std::fs::read(&self.file)
            .with_context(|| format!("read `{}` failed", self.file.display()))?;
        let sig = self.signature()?;

        let hash = self.hash.unwrap_or(config.hash);
        let salt_len = self.salt_len.unwrap_or(config.salt_len);
        log::debug!("verify with {hash}, salt length {salt_len}");

        match verify_message(&key, hash, salt_len, &msg, &sig) {
            Ok(()) => {
                println!("Validation success.");
                Ok(true)
            }
            Err(CipherError::Verification) => {
                eprintln!("Validation failed.");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
