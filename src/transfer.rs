use std::{any::type_name, fmt, ptr::NonNull};

use log::debug;

use crate::counter::RefCounted;

/// One already-retained strong reference in transit.
///
/// Producers that hand out a reference they have already counted (factories,
/// `forget`) return a `Transfer`. The receiving pointer adopts it without
/// retaining again. The carried reference may be null.
///
/// A transfer is consumed exactly once, by `take` or `into_raw`. Taking
/// twice is a programming error and panics in invariant-checking mode. A
/// transfer dropped without being consumed releases its reference.
#[must_use = "dropping a transfer releases the reference it carries"]
pub struct Transfer<T: RefCounted>
{
    ptr: Option<NonNull<T>>,
    #[cfg(any(debug_assertions, feature = "checked"))]
    consumed: bool,
}

impl<T: RefCounted> Transfer<T>
{
    /// A transfer carrying nothing.
    pub const fn null() -> Self
    {
        Self {
            ptr: None,
            #[cfg(any(debug_assertions, feature = "checked"))]
            consumed: false,
        }
    }

    /// Wrap a pointer whose strong reference the caller already owns.
    ///
    /// # Safety
    ///
    /// `ptr` is null, or points to a live object and carries one strong
    /// reference the caller gives up.
    pub unsafe fn from_raw(ptr: *const T) -> Self
    {
        Self {
            ptr: NonNull::new(ptr as *mut T),
            #[cfg(any(debug_assertions, feature = "checked"))]
            consumed: false,
        }
    }

    /// Consume the transfer, yielding the carried reference.
    ///
    /// The caller now owns that reference and must release it eventually.
    #[track_caller]
    pub fn take(&mut self) -> Option<NonNull<T>>
    {
        #[cfg(any(debug_assertions, feature = "checked"))]
        {
            if self.consumed {
                panic!("Transfer<{}> was already consumed", type_name::<T>());
            }
            self.consumed = true;
        }
        self.ptr.take()
    }

    /// Consume the transfer, yielding the carried reference as a raw pointer
    /// (null if it carried nothing).
    pub fn into_raw(mut self) -> *const T
    {
        self.take()
            .map_or(std::ptr::null(), |p| p.as_ptr() as *const T)
    }

    /// The carried pointer, without consuming anything.
    pub fn as_ptr(&self) -> *const T
    {
        self.ptr
            .map_or(std::ptr::null(), |p| p.as_ptr() as *const T)
    }
}

impl<T: RefCounted> Drop for Transfer<T>
{
    fn drop(&mut self)
    {
        if let Some(p) = self.ptr.take() {
            debug!("unconsumed Transfer<{}> releasing {:p}", type_name::<T>(), p);
            unsafe { T::release(p) }
        }
    }
}

impl<T: RefCounted> fmt::Debug for Transfer<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_tuple("Transfer").field(&self.as_ptr()).finish()
    }
}
