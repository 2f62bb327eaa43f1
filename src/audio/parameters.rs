// Atomic parameters - Lock-free communication UI ↔ Audio thread
// Uses atomic operations to share parameters between threads without locks

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};

/// Thread-safe f32 parameter using atomic operations
/// Converts f32 to u32 bits for atomic storage
#[derive(Clone)]
pub struct AtomicF32 {
    inner: Arc<AtomicU32>,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    /// Set the value (called from UI thread)
    pub fn set(&self, value: f32) {
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Get the value (called from audio thread)
    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Same as [`AtomicF32`] with double precision, used for tempo
#[derive(Clone)]
pub struct AtomicF64 {
    inner: Arc<AtomicU64>,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            inner: Arc::new(AtomicU64::new(value.to_bits())),
        }
    }

    pub fn set(&self, value: f64) {
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Small integer parameter (numerator, denominator, subdivision)
#[derive(Clone, Default)]
pub struct AtomicU8Param {
    inner: Arc<AtomicU8>,
}

impl AtomicU8Param {
    pub fn new(value: u8) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(value)),
        }
    }

    pub fn set(&self, value: u8) {
        self.inner.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u8 {
        self.inner.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f32_shared_between_clones() {
        let param = AtomicF32::new(0.5);
        let clone = param.clone();
        clone.set(0.25);
        assert_eq!(param.get(), 0.25);
    }

    #[test]
    fn test_atomic_f64_roundtrip_precision() {
        let param = AtomicF64::new(0.0);
        param.set(117.333_333_333);
        assert_eq!(param.get(), 117.333_333_333);
    }

    #[test]
    fn test_atomic_u8() {
        let param = AtomicU8Param::new(4);
        let clone = param.clone();
        clone.set(8);
        assert_eq!(param.get(), 8);
    }
}
