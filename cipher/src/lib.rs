mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand, RandError};

pub mod rsa;

pub trait Sign {
    // 写入sign之前不清空
    fn sign(&self, msg: &[u8], sign: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Verify {
    fn verify(&self, msg: &[u8], sign: &[u8]) -> Result<(), CipherError>;
}

pub trait Signer: Sign + Verify {}

impl<T> Signer for T where T: Sign + Verify {}
