use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use cipher::rsa::{sign_pss, PrivateKey, SaltLength};
use cipher::{CipherError, DefaultRand, Rand};
use clap::Args;
use crypto_hash::HashKind;

use super::{KeyFile, PssConfig};
use crate::log_error;

#[derive(Args, Debug)]
pub struct SignArgs {
    /// the JSON key file contains `n, e, d` and optional `primes`
    #[arg(short, long)]
    key: PathBuf,

    /// the file to be signed
    #[arg(short, long)]
    file: PathBuf,

    /// the message digest algorithm, overrides the configuration
    #[arg(long)]
    hash: Option<HashKind>,

    /// `auto`, `hash` or the salt length in bytes, overrides the configuration
    #[arg(long)]
    salt_len: Option<SaltLength>,

    /// don't blind the private key operation
    #[arg(long)]
    no_blinding: bool,

    /// write the raw signature bytes to the file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// 使用`hash`计算消息摘要, 随机生成盐并签名
pub fn sign_message(
    key: &PrivateKey,
    hash: HashKind,
    salt_len: SaltLength,
    blinding: bool,
    msg: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let (mut hasher, hashed) = (hash.hasher(), hash.digest(msg));
    let em_len = (key.public_key().bits().saturating_sub(1) + 7) >> 3;
    let mut rng = DefaultRand::default();

    let (hlen, slen) = (hash.output_len(), salt_len.resolve(em_len, hash.output_len()));
    if slen > em_len.saturating_sub(hlen + 2) {
        return Err(CipherError::EncodingTooShort {
            em_len,
            hash_len: hlen,
            salt_len: slen,
        });
    }

    let mut salt = vec![0u8; slen];
    rng.rand(salt.as_mut_slice())?;

    if blinding {
        sign_pss(Some(&mut rng), key, &mut *hasher, &hashed, &salt)
    } else {
        sign_pss(None::<&mut DefaultRand>, key, &mut *hasher, &hashed, &salt)
    }
}

impl SignArgs {
    pub fn exe(self, config: &PssConfig) -> bool {
        log_error(self.run(config)).is_some()
    }

    fn run(self, config: &PssConfig) -> anyhow::Result<()> {
        let key = KeyFile::open(&self.key)?.private_key()?;
        let msg = std::fs::read(&self.file)
            .with_context(|| format!("read `{}` failed", self.file.display()))?;

        let hash = self.hash.unwrap_or(config.hash);
        let salt_len = self.salt_len.unwrap_or(config.salt_len);
        let blinding = config.blinding && !self.no_blinding;
        log::debug!("sign with {hash}, salt length {salt_len}, blinding {blinding}");

        let sig = sign_message(&key, hash, salt_len, blinding, &msg)?;

        if let Some(o) = self.output {
            let mut f = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&o)
                .with_context(|| format!("create `{}` failed", o.display()))?;
            f.write_all(&sig)?;
        }

        println!("{}", hex::encode(&sig));
        Ok(())
    }
}
