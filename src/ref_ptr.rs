use std::{fmt, mem, ptr::NonNull};

use crate::{
    counter::RefCounted,
    holder::RawHolder,
    transfer::Transfer,
    traverse::{TraversalCallback, Traverse, TraverseFlags},
};

/// Nullable strong reference.
///
/// The sibling of `NonNullOwningRef` for places where "no object" is a
/// legitimate state. Also the slot a `NonNullOwningRef` keeps its reference
/// in.
pub struct RefPtr<T: RefCounted>
{
    ptr: Option<NonNull<T>>,
}

impl<T: RefCounted> RefPtr<T>
{
    pub const fn null() -> Self { Self { ptr: None } }

    /// Retain `it`.
    pub fn new(it: &T) -> Self
    {
        it.retain();
        Self {
            ptr: Some(NonNull::from(it)),
        }
    }

    /// Adopt the reference carried by `it` without retaining.
    pub fn adopt(mut it: Transfer<T>) -> Self { Self { ptr: it.take() } }

    /// Retain whatever `ptr` points to. Null gives a null `RefPtr`.
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live object.
    pub unsafe fn from_raw(ptr: *const T) -> Self
    {
        let mut res = Self::null();
        res.set_raw(ptr);
        res
    }

    /// Retain whatever another holder holds.
    pub fn from_holder<H: RawHolder<T>>(holder: &H) -> Self
    {
        unsafe { Self::from_raw(holder.as_raw()) }
    }

    pub fn set(&mut self, it: &T) { self.assign_with_retain(Some(NonNull::from(it))) }

    /// # Safety
    ///
    /// `ptr` is null or points to a live object.
    pub unsafe fn set_raw(&mut self, ptr: *const T)
    {
        self.assign_with_retain(NonNull::new(ptr as *mut T))
    }

    pub fn set_transfer(&mut self, mut it: Transfer<T>)
    {
        self.assign_assuming_retained(it.take())
    }

    pub fn set_from_holder<H: RawHolder<T>>(&mut self, holder: &H)
    {
        unsafe { self.set_raw(holder.as_raw()) }
    }

    /// Release the held reference, if any.
    pub fn clear(&mut self) { self.assign_assuming_retained(None) }

    pub fn get(&self) -> Option<NonNull<T>> { self.ptr }

    pub fn as_ref(&self) -> Option<&T> { self.ptr.map(|p| unsafe { &*p.as_ptr() }) }

    pub fn as_ptr(&self) -> *const T
    {
        self.ptr
            .map_or(std::ptr::null(), |p| p.as_ptr() as *const T)
    }

    pub fn is_null(&self) -> bool { self.ptr.is_none() }

    /// Hand out the held reference without releasing it, leaving `self`
    /// null.
    pub fn forget(&mut self) -> Transfer<T>
    {
        let ptr = self.ptr.take();
        unsafe { Transfer::from_raw(ptr.map_or(std::ptr::null(), |p| p.as_ptr() as *const T)) }
    }

    /// Exchange held references. Counts are untouched.
    pub fn swap(&mut self, other: &mut RefPtr<T>) { mem::swap(&mut self.ptr, &mut other.ptr) }

    /// Retain first so that assigning the held object to itself cannot free
    /// it in between.
    fn assign_with_retain(&mut self, ptr: Option<NonNull<T>>)
    {
        if let Some(p) = ptr {
            unsafe { p.as_ref().retain() }
        }
        self.assign_assuming_retained(ptr)
    }

    pub(crate) fn assign_assuming_retained(&mut self, ptr: Option<NonNull<T>>)
    {
        if let Some(old) = mem::replace(&mut self.ptr, ptr) {
            unsafe { T::release(old) }
        }
    }
}

impl<T: RefCounted> Drop for RefPtr<T>
{
    fn drop(&mut self) { self.clear() }
}

impl<T: RefCounted> Clone for RefPtr<T>
{
    fn clone(&self) -> Self { unsafe { Self::from_raw(self.as_ptr()) } }
}

impl<T: RefCounted> Default for RefPtr<T>
{
    fn default() -> Self { Self::null() }
}

impl<T: RefCounted> From<Transfer<T>> for RefPtr<T>
{
    fn from(it: Transfer<T>) -> Self { Self::adopt(it) }
}

impl<T: RefCounted> From<&T> for RefPtr<T>
{
    fn from(it: &T) -> Self { Self::new(it) }
}

unsafe impl<T: RefCounted> RawHolder<T> for RefPtr<T>
{
    fn as_raw(&self) -> *const T { self.as_ptr() }
}

impl<T: RefCounted> Traverse for RefPtr<T>
{
    fn traverse(
        &self, callback: &mut dyn TraversalCallback, owner: &str, field: &str,
        flags: TraverseFlags,
    )
    {
        if let Some(p) = self.ptr {
            callback.note_child(owner, field, flags, p.cast())
        }
    }
}

impl<T: RefCounted> fmt::Debug for RefPtr<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_tuple("RefPtr").field(&self.as_ptr()).finish()
    }
}
