//! Hooks for an external cycle collector.
//!
//! The collector itself lives elsewhere. What this crate offers is the edge
//! reporting side: every owning pointer implements `Traverse`, and reports the
//! object it keeps alive to a `TraversalCallback` exactly once per request.
//!
//! ```
//! use owning_nonnull::{Counted, EdgeRecorder, NonNullOwningRef, Traverse, TraverseFlags};
//!
//! let child = NonNullOwningRef::adopt(Counted::new(42u32));
//! let mut recorder = EdgeRecorder::default();
//! child.traverse(&mut recorder, "Parent", "child", TraverseFlags::NONE);
//!
//! assert_eq!(recorder.edges().len(), 1);
//! assert_eq!(recorder.edges()[0].child, child.get().cast());
//! ```

use std::{fmt, ops::BitOr, ptr::NonNull};

use log::trace;

/// Per-edge flags passed through to the collector.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TraverseFlags(u32);

impl TraverseFlags
{
    pub const NONE: Self = Self(0);

    /// The edge is one element of a collection field. Set by the `Vec`
    /// implementation.
    pub const ARRAY_ELEMENT: Self = Self(1);

    pub const fn from_bits(bits: u32) -> Self { Self(bits) }

    pub const fn bits(self) -> u32 { self.0 }

    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
}

impl BitOr for TraverseFlags
{
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl fmt::Debug for TraverseFlags
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "TraverseFlags({:#x})", self.0)
    }
}

/// The collector's side of a traversal.
pub trait TraversalCallback
{
    /// Note that `owner` keeps `child` alive through its field `field`.
    fn note_child(&mut self, owner: &str, field: &str, flags: TraverseFlags, child: NonNull<()>);
}

/// Report the owning edges held by a field.
pub trait Traverse
{
    fn traverse(
        &self, callback: &mut dyn TraversalCallback, owner: &str, field: &str,
        flags: TraverseFlags,
    );
}

impl<T: Traverse> Traverse for Option<T>
{
    fn traverse(
        &self, callback: &mut dyn TraversalCallback, owner: &str, field: &str,
        flags: TraverseFlags,
    )
    {
        if let Some(it) = self {
            it.traverse(callback, owner, field, flags)
        }
    }
}

impl<T: Traverse> Traverse for Vec<T>
{
    fn traverse(
        &self, callback: &mut dyn TraversalCallback, owner: &str, field: &str,
        flags: TraverseFlags,
    )
    {
        for it in self {
            it.traverse(callback, owner, field, flags | TraverseFlags::ARRAY_ELEMENT)
        }
    }
}

/// One reported owning edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge
{
    pub owner: String,
    pub field: String,
    pub flags: TraverseFlags,
    pub child: NonNull<()>,
}

/// A callback that just remembers every edge reported to it, in order.
///
/// Handy for tests and for dumping an object graph when hunting leaks.
#[derive(Debug, Default)]
pub struct EdgeRecorder
{
    edges: Vec<Edge>,
}

impl EdgeRecorder
{
    pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Edges reported on behalf of `owner`.
    pub fn edges_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Edge> + 'a
    {
        self.edges.iter().filter(move |e| e.owner == owner)
    }

    pub fn into_edges(self) -> Vec<Edge> { self.edges }
}

impl TraversalCallback for EdgeRecorder
{
    fn note_child(&mut self, owner: &str, field: &str, flags: TraverseFlags, child: NonNull<()>)
    {
        trace!("edge {}.{} -> {:p} ({:?})", owner, field, child, flags);
        self.edges.push(Edge {
            owner: owner.to_owned(),
            field: field.to_owned(),
            flags,
            child,
        });
    }
}
