use crate::counter::RefCounted;

/// A strong-reference holder that can expose what it holds as a raw pointer.
///
/// This is the one entry point the smart pointers in this crate use to
/// convert between each other, so no pointer type needs to know another's
/// internals. Any holder can be turned into any other by reading `as_raw` and
/// retaining the result.
///
/// # Safety
///
/// `as_raw` returns null, or a pointer to an object kept alive by a strong
/// reference owned by `self`.
pub unsafe trait RawHolder<T: RefCounted>
{
    fn as_raw(&self) -> *const T;
}
