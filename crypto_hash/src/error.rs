use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HashError {
    /// 不支持的哈希算法名称
    #[error("hash: unsupported hash algorithm `{0}`")]
    Unsupported(String),
}
