use crate::{Rand, RandError};
use xrand::rngs::OsRng;
use xrand::RngCore;

/// 默认使用OsRng <br>
#[derive(Copy, Clone, Default)]
pub struct DefaultRand {
    rng: OsRng,
}

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) -> Result<(), RandError> {
        self.rng
            .try_fill_bytes(random)
            .map_err(|e| RandError::Source(e.to_string()))
    }
}
