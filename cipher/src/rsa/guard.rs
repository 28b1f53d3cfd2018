use crypto_hash::DigestX;
use std::ops::{Deref, DerefMut};

/// 独占借用一个哈希实例, 获取时和离开作用域时(包括出错提前返回)都会重置哈希状态,
/// 调用者拿回的哈希实例总是处于初始化状态.
pub(super) struct HashGuard<'a, H: DigestX + ?Sized> {
    hasher: &'a mut H,
}

impl<'a, H: DigestX + ?Sized> HashGuard<'a, H> {
    pub(super) fn new(hasher: &'a mut H) -> Self {
        hasher.reset_x();
        Self { hasher }
    }

    /// 摘要字节长度
    pub(super) fn hash_len(&self) -> usize {
        (self.hasher.digest_bits_x() + 7) >> 3
    }
}

impl<'a, H: DigestX + ?Sized> Deref for HashGuard<'a, H> {
    type Target = H;

    fn deref(&self) -> &Self::Target {
        self.hasher
    }
}

impl<'a, H: DigestX + ?Sized> DerefMut for HashGuard<'a, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.hasher
    }
}

impl<'a, H: DigestX + ?Sized> Drop for HashGuard<'a, H> {
    fn drop(&mut self) {
        self.hasher.reset_x();
    }
}
