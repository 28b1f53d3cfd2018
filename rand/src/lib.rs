use thiserror::Error;

mod default_rand;
pub use default_rand::DefaultRand;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RandError {
    /// 随机源无法提供数据
    #[error("rand: the random source failed, {0}")]
    Source(String),
}

/// 密码学安全的随机字节源
pub trait Rand: Default {
    fn rand(&mut self, random: &mut [u8]) -> Result<(), RandError>;
}
