//! Stable hashing for fabric keys.
//!
//! `std::hash::Hash` is derived on every identifier for use in `HashMap` and
//! `HashSet`, but the values that reach a `Hasher` depend on the hasher's
//! seed. [`StableHash`] produces the same 32-bit word on every run and every
//! platform, which is what scripts see through `hash(x)`.

/// Combine two hash words.
#[inline]
#[must_use]
pub const fn mkhash(a: u32, b: u32) -> u32 {
    (a << 5).wrapping_add(a) ^ b
}

/// Run-independent hashing.
///
/// Implementations must agree with `Eq`: equal values hash equal.
pub trait StableHash {
    /// Hash word for this value.
    fn stable_hash(&self) -> u32;
}

impl StableHash for i16 {
    fn stable_hash(&self) -> u32 {
        u32::from(*self as u16)
    }
}

impl StableHash for i32 {
    fn stable_hash(&self) -> u32 {
        *self as u32
    }
}

impl StableHash for u32 {
    fn stable_hash(&self) -> u32 {
        *self
    }
}

impl StableHash for bool {
    fn stable_hash(&self) -> u32 {
        u32::from(*self)
    }
}
