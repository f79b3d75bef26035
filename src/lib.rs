//! Strong, non-null owning references to intrusively reference-counted
//! objects.
//!
//! Plenty of call sites hold a reference-counted value that cannot possibly
//! be absent: something fresh out of a factory, or an argument whose caller
//! promised it. `NonNullOwningRef` states that in the type, so those sites
//! never carry a null check and never grow a null dereference.
//!
//! The crate provides
//!
//! - the `RefCounted` capability, implemented by `Counted<T>` allocations
//!   (or by hand for custom intrusive types),
//! - `Transfer`, the move-only carrier of an already-retained reference,
//! - `RefPtr`, the nullable sibling used where absence is legitimate,
//! - `NonNullOwningRef` itself,
//! - the `Traverse`/`TraversalCallback` pair an external cycle collector
//!   uses to walk owning edges.
//!
//! Misuse (touching an uninitialized wrapper, consuming a transfer twice,
//! handing in a null raw pointer) is a programming error. These are caught by
//! panics in invariant-checking mode, which is on in debug builds and can be
//! forced in release builds with the `checked` feature.
//!
//! ```
//! use owning_nonnull::{Counted, NonNullOwningRef, RefCounted, RefPtr};
//!
//! let factory = RefPtr::adopt(Counted::new(String::from("node")));
//! let node = NonNullOwningRef::from_holder(&factory);
//!
//! assert_eq!(node.ref_count(), 2);
//! assert_eq!(node.len(), 4);
//! ```

/// Whether invariant-checking mode is compiled in.
pub(crate) const CHECKED: bool = cfg!(any(debug_assertions, feature = "checked"));

/// Panics with the given message when checking is on and the condition
/// fails. Compiles to nothing otherwise.
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if $crate::CHECKED && !$cond {
            panic!($($arg)+)
        }
    };
}

pub mod axioms;
pub(crate) mod counted;
pub(crate) mod counter;
pub(crate) mod error;
pub(crate) mod holder;
#[cfg(feature = "global")]
pub mod ledger;
pub(crate) mod nonnull;
pub(crate) mod ref_ptr;
#[cfg(feature = "global")]
pub(crate) mod stats;
pub mod traverse;
pub(crate) mod transfer;

#[cfg(test)]
mod tests;

pub use axioms::Axioms;
pub use counted::Counted;
pub use counter::{RefCount, RefCounted};
pub use error::Error;
pub use holder::RawHolder;
pub use nonnull::NonNullOwningRef;
pub use ref_ptr::RefPtr;
#[cfg(feature = "global")]
pub use stats::Stats;
pub use transfer::Transfer;
pub use traverse::{Edge, EdgeRecorder, TraversalCallback, Traverse, TraverseFlags};
