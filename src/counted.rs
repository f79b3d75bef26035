use std::{any::type_name, fmt, ops::Deref, ptr::NonNull};

use log::{debug, trace};

use crate::{
    counter::{RefCount, RefCounted},
    transfer::Transfer,
};

/// A heap allocation carrying its own strong reference count.
///
/// `Counted::new` is the factory: it hands back the allocation's first
/// reference as a `Transfer`, ready to be adopted by whichever pointer
/// should own it.
///
/// Counted allocations are `#[repr(C)]` with the value first, so the address
/// of the allocation is also the address of the value.
#[repr(C)]
pub struct Counted<T>
{
    value: T,
    count: RefCount,
}

impl<T> Counted<T>
{
    /// Allocate `value` with a reference count of one.
    pub fn new(value: T) -> Transfer<Counted<T>>
    {
        let ptr = NonNull::from(Box::leak(Box::new(Counted {
            value,
            count: RefCount::new(1),
        })));
        debug!("allocated {} at {:p}", type_name::<T>(), ptr);
        #[cfg(feature = "global")]
        crate::ledger::register(ptr.as_ptr() as *const Self, type_name::<T>());
        unsafe { Transfer::from_raw(ptr.as_ptr()) }
    }

    /// Borrow the value.
    pub fn value(&self) -> &T { &self.value }
}

unsafe impl<T> RefCounted for Counted<T>
{
    fn retain(&self)
    {
        let n = self.count.increment();
        trace!("retain {:p} -> {}", self, n);
    }

    unsafe fn release(this: NonNull<Self>)
    {
        let n = this.as_ref().count.decrement();
        trace!("release {:p} -> {}", this, n);
        if n == 0 {
            debug!("destroying {} at {:p}", type_name::<T>(), this);
            #[cfg(feature = "global")]
            crate::ledger::unregister(this.as_ptr() as *const Self);
            drop(Box::from_raw(this.as_ptr()));
        }
    }

    fn ref_count(&self) -> usize { self.count.get() }
}

impl<T> Deref for Counted<T>
{
    type Target = T;

    fn deref(&self) -> &Self::Target { &self.value }
}

impl<T: fmt::Debug> fmt::Debug for Counted<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Counted")
            .field("value", &self.value)
            .field("count", &self.count.get())
            .finish()
    }
}
