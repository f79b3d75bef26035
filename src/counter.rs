use std::{
    ptr::NonNull,
    sync::atomic::{fence, AtomicUsize, Ordering},
};

/// Intrusive strong-reference capability.
///
/// # Safety
///
/// Implementors promise that an object stays alive for as long as its count
/// is positive, and that `release` dropping the count to zero is the one and
/// only point where the object is destroyed. Every smart pointer in this crate
/// relies on that to hand out references tied to its own lifetime.
pub unsafe trait RefCounted
{
    /// Add one strong reference.
    fn retain(&self);

    /// Drop one strong reference, destroying the object when none remain.
    ///
    /// # Safety
    ///
    /// `this` must point to a live object and the caller must own one of its
    /// strong references, which is consumed by this call.
    unsafe fn release(this: NonNull<Self>);

    /// Current number of strong references. For diagnostics and tests.
    fn ref_count(&self) -> usize;
}

/// Embeddable strong reference counter.
///
/// The building block for hand-written `RefCounted` implementations.
/// Atomic, but the smart pointers built on it do no synchronization of their
/// own.
pub struct RefCount(AtomicUsize);

impl RefCount
{
    /// A counter already holding `initial` references.
    pub const fn new(initial: usize) -> Self { Self(AtomicUsize::new(initial)) }

    /// Increments and returns the new count.
    pub fn increment(&self) -> usize
    {
        let prev = self.0.fetch_add(1, Ordering::Relaxed);
        if prev == usize::MAX {
            panic!("reference count overflow");
        }
        prev + 1
    }

    /// Decrements and returns the new count.
    ///
    /// A zero result synchronizes with every earlier decrement, so the caller
    /// may destroy the object right away.
    pub fn decrement(&self) -> usize
    {
        let prev = self.0.fetch_sub(1, Ordering::Release);
        if prev == 0 {
            panic!("reference count underflow");
        }
        if prev == 1 {
            fence(Ordering::Acquire);
        }
        prev - 1
    }

    pub fn get(&self) -> usize { self.0.load(Ordering::Relaxed) }
}

impl std::fmt::Debug for RefCount
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_tuple("RefCount").field(&self.get()).finish()
    }
}
