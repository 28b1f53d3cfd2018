use rand::RandError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// 输入的摘要长度与哈希算法的摘要长度不一致
    #[error("pss: input must be hashed message, digest length `{real}` not match to `{target}`")]
    InvalidDigestLen { target: usize, real: usize },

    /// 编码消息长度容纳不下`hash_len + salt_len + 2`字节
    #[error("pss: encoding error, `{em_len}` bytes encoded message is too short for hash length `{hash_len}` and salt length `{salt_len}`")]
    EncodingTooShort {
        em_len: usize,
        hash_len: usize,
        salt_len: usize,
    },

    /// 签名验证失败, 不区分具体原因
    #[error("rsa: verification error")]
    Verification,

    /// 密文不小于模数
    #[error("rsa: decryption error")]
    Decryption,

    #[error(transparent)]
    Rand(#[from] RandError),

    /// 连续多次无法得到可逆的盲化因子
    #[error("rsa: no invertible blinding factor after `{0}` attempts")]
    BlindingExhausted(usize),

    #[error("{0}")]
    InvalidPublicKey(String),

    #[error("{0}")]
    InvalidPrivateKey(String),

    #[error("{0}")]
    Other(String),
}
