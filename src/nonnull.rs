use std::{any::type_name, fmt, ops::Deref, ptr::NonNull};

use log::trace;

use crate::{
    counter::RefCounted,
    error::Error,
    holder::RawHolder,
    ref_ptr::RefPtr,
    transfer::Transfer,
    traverse::{TraversalCallback, Traverse, TraverseFlags},
};

/// Strong reference that is never null.
///
/// Holds exactly one strong reference to a `T`, retained on construction from
/// a borrowed or raw source and adopted without retaining from a `Transfer`.
/// Dropping it releases that reference.
///
/// The one exception to "never null" is the uninitialized state: a wrapper
/// made with `uninit()` (or `Default`), or one whose reference was handed out
/// by `forget()`. Dereferencing it in that state is a programming error and
/// panics.
///
/// There is no way to test a `NonNullOwningRef` for truthiness, since the
/// answer would always be yes. Code that needs "maybe absent" uses `RefPtr`
/// or `Option` and converts at the boundary.
///
/// ```compile_fail
/// use owning_nonnull::{Counted, NonNullOwningRef};
///
/// let w = NonNullOwningRef::adopt(Counted::new(1));
/// if w {}
/// ```
///
/// Nor can it be built from, or assigned, anything null-representing:
///
/// ```compile_fail
/// use owning_nonnull::{Counted, NonNullOwningRef};
///
/// let w: NonNullOwningRef<Counted<i32>> = None.into();
/// ```
///
/// ```compile_fail
/// use owning_nonnull::{Counted, NonNullOwningRef};
///
/// let w: NonNullOwningRef<Counted<i32>> = std::ptr::null::<Counted<i32>>().into();
/// ```
pub struct NonNullOwningRef<T: RefCounted>
{
    slot: RefPtr<T>,
    #[cfg(any(debug_assertions, feature = "checked"))]
    inited: bool,
}

impl<T: RefCounted> NonNullOwningRef<T>
{
    /// A wrapper holding nothing yet. It must be assigned before use.
    pub const fn uninit() -> Self
    {
        Self {
            slot: RefPtr::null(),
            #[cfg(any(debug_assertions, feature = "checked"))]
            inited: false,
        }
    }

    /// Retain `it`.
    pub fn new(it: &T) -> Self
    {
        let mut res = Self::uninit();
        res.set(it);
        res
    }

    /// Take over the reference carried by `it` without retaining.
    ///
    /// `it` must carry a reference and must not have been consumed already.
    #[track_caller]
    pub fn adopt(it: Transfer<T>) -> Self
    {
        let mut res = Self::uninit();
        res.set_transfer(it);
        res
    }

    /// Retain the object at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live object. A null `ptr` panics in
    /// invariant-checking mode and is undefined behavior otherwise.
    #[track_caller]
    pub unsafe fn from_raw(ptr: *const T) -> Self
    {
        let mut res = Self::uninit();
        res.set_raw(ptr);
        res
    }

    /// Retain whatever another holder holds.
    ///
    /// Panics if the holder is empty.
    #[track_caller]
    pub fn from_holder<H: RawHolder<T>>(holder: &H) -> Self
    {
        let mut res = Self::uninit();
        res.set_from_holder(holder);
        res
    }

    /// Replace the held reference with a retained `it`.
    pub fn set(&mut self, it: &T)
    {
        self.slot.set(it);
        self.mark_initialized();
    }

    /// Replace the held reference with the one carried by `it`.
    #[track_caller]
    pub fn set_transfer(&mut self, mut it: Transfer<T>)
    {
        let ptr = it.take();
        invariant!(
            ptr.is_some(),
            "NonNullOwningRef<{}> assigned a null transfer",
            type_name::<T>()
        );
        self.slot.assign_assuming_retained(ptr);
        self.mark_initialized();
    }

    /// Replace the held reference with a retained `ptr`.
    ///
    /// # Safety
    ///
    /// Same contract as `from_raw`.
    #[track_caller]
    pub unsafe fn set_raw(&mut self, ptr: *const T)
    {
        invariant!(
            !ptr.is_null(),
            "NonNullOwningRef<{}> assigned a null pointer",
            type_name::<T>()
        );
        self.slot.set(NonNull::new_unchecked(ptr as *mut T).as_ref());
        self.mark_initialized();
    }

    /// Replace the held reference with whatever another holder holds.
    ///
    /// Panics if the holder is empty. Unlike `set_raw` this check is never
    /// compiled out, since the call is safe.
    #[track_caller]
    pub fn set_from_holder<H: RawHolder<T>>(&mut self, holder: &H)
    {
        match NonNull::new(holder.as_raw() as *mut T) {
            Some(p) => unsafe { self.set(p.as_ref()) },
            None => panic!(
                "NonNullOwningRef<{}> assigned from an empty holder",
                type_name::<T>()
            ),
        }
    }

    /// The held pointer.
    #[track_caller]
    pub fn get(&self) -> NonNull<T>
    {
        #[cfg(any(debug_assertions, feature = "checked"))]
        if !self.inited {
            panic!(
                "NonNullOwningRef<{}> used before initialization",
                type_name::<T>()
            );
        }
        match self.slot.get() {
            Some(p) => p,
            None => panic!("NonNullOwningRef<{}> was set to null", type_name::<T>()),
        }
    }

    #[track_caller]
    pub fn as_ptr(&self) -> *const T { self.get().as_ptr() }

    /// Hand out the held reference, leaving the wrapper uninitialized.
    #[track_caller]
    pub fn forget(&mut self) -> Transfer<T>
    {
        #[cfg(any(debug_assertions, feature = "checked"))]
        {
            if !self.inited {
                panic!(
                    "NonNullOwningRef<{}> forgotten before initialization",
                    type_name::<T>()
                );
            }
            self.inited = false;
        }
        let res = self.slot.forget();
        trace!("forget {:p}", res.as_ptr());
        res
    }

    /// Exchange held references with another wrapper. Counts are untouched.
    pub fn swap(&mut self, other: &mut Self)
    {
        self.slot.swap(&mut other.slot);
        #[cfg(any(debug_assertions, feature = "checked"))]
        std::mem::swap(&mut self.inited, &mut other.inited);
    }

    /// Exchange held references with a `RefPtr`. Counts are untouched.
    ///
    /// Swapping a null `RefPtr` into an initialized wrapper would break the
    /// non-null guarantee and panics in invariant-checking mode.
    #[track_caller]
    pub fn swap_ptr(&mut self, other: &mut RefPtr<T>)
    {
        #[cfg(any(debug_assertions, feature = "checked"))]
        if self.inited && other.is_null() {
            panic!(
                "NonNullOwningRef<{}> swapped with a null RefPtr",
                type_name::<T>()
            );
        }
        self.slot.swap(other);
        #[cfg(any(debug_assertions, feature = "checked"))]
        {
            self.inited = !self.slot.is_null();
        }
    }

    /// Whether two wrappers hold the same object.
    #[track_caller]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool { this.get() == other.get() }

    #[track_caller]
    fn mark_initialized(&mut self)
    {
        invariant!(
            !self.slot.is_null(),
            "NonNullOwningRef<{}> was set to null",
            type_name::<T>()
        );
        #[cfg(any(debug_assertions, feature = "checked"))]
        {
            self.inited = true;
        }
    }
}

impl<T: RefCounted> Deref for NonNullOwningRef<T>
{
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T { unsafe { &*self.get().as_ptr() } }
}

impl<T: RefCounted> AsRef<T> for NonNullOwningRef<T>
{
    #[track_caller]
    fn as_ref(&self) -> &T { self }
}

impl<T: RefCounted> Clone for NonNullOwningRef<T>
{
    fn clone(&self) -> Self
    {
        Self {
            slot: self.slot.clone(),
            #[cfg(any(debug_assertions, feature = "checked"))]
            inited: self.inited,
        }
    }
}

impl<T: RefCounted> Default for NonNullOwningRef<T>
{
    fn default() -> Self { Self::uninit() }
}

impl<T: RefCounted> From<&T> for NonNullOwningRef<T>
{
    fn from(it: &T) -> Self { Self::new(it) }
}

impl<T: RefCounted> From<Transfer<T>> for NonNullOwningRef<T>
{
    #[track_caller]
    fn from(it: Transfer<T>) -> Self { Self::adopt(it) }
}

impl<T: RefCounted> TryFrom<RefPtr<T>> for NonNullOwningRef<T>
{
    type Error = Error;

    fn try_from(mut it: RefPtr<T>) -> Result<Self, Error>
    {
        if it.is_null() {
            return Err(Error::Null {
                type_name: type_name::<T>(),
            });
        }
        Ok(Self::adopt(it.forget()))
    }
}

impl<T: RefCounted> From<&NonNullOwningRef<T>> for RefPtr<T>
{
    #[track_caller]
    fn from(it: &NonNullOwningRef<T>) -> Self { RefPtr::from_holder(it) }
}

impl<T: RefCounted> From<NonNullOwningRef<T>> for RefPtr<T>
{
    #[track_caller]
    fn from(mut it: NonNullOwningRef<T>) -> Self { RefPtr::adopt(it.forget()) }
}

unsafe impl<T: RefCounted> RawHolder<T> for NonNullOwningRef<T>
{
    #[track_caller]
    fn as_raw(&self) -> *const T { self.as_ptr() }
}

impl<T: RefCounted> Traverse for NonNullOwningRef<T>
{
    #[track_caller]
    fn traverse(
        &self, callback: &mut dyn TraversalCallback, owner: &str, field: &str,
        flags: TraverseFlags,
    )
    {
        callback.note_child(owner, field, flags, self.get().cast())
    }
}

impl<T: RefCounted> fmt::Debug for NonNullOwningRef<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.slot.get() {
            Some(p) => f.debug_tuple("NonNullOwningRef").field(&p).finish(),
            None => f.write_str("NonNullOwningRef(<uninitialized>)"),
        }
    }
}

impl<T: RefCounted> fmt::Pointer for NonNullOwningRef<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Pointer::fmt(&self.slot.as_ptr(), f)
    }
}
