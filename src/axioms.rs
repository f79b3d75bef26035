/// Simple axiomatic account of reference count bookkeeping.
///
/// Every operation on strong references is viewed in terms of how it moves
/// references between the places that can own one. We denote the state of a
/// single object as the number of references in each place, together with
/// the object's reference count. The bookkeeping is sound when, after every
/// step, the count equals the number of references owned somewhere:
///
/// ```notest
/// self.count == self.owners + self.held + self.in_flight
/// ```
///
/// A wrapper holds at most one reference (`held` is 0 or 1), and only a
/// count of zero lets the object be freed.
///
/// Each axiom asserts its preconditions and the balance above, so a sequence
/// of axioms that runs without panicking is a proof that the corresponding
/// sequence of pointer operations neither leaks nor frees early.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axioms
{
    /// The object's reference count.
    pub count: usize,

    /// References owned by nullable pointers and other plain owners.
    pub owners: usize,

    /// References held by the `NonNullOwningRef` under observation.
    pub held: usize,

    /// References travelling inside unconsumed transfers.
    pub in_flight: usize,
}

impl Axioms
{
    /// A factory allocates an object and hands its single reference out in a
    /// transfer.
    ///
    /// ```notest
    /// Self { count: 1, owners: 0, held: 0, in_flight: 1 }
    /// ```
    ///
    /// Sequencing property:
    ///
    /// ```
    /// owning_nonnull::Axioms::alloc().drop_transfer().free();
    /// ```
    pub fn alloc() -> Self
    {
        Self {
            count: 1,
            owners: 0,
            held: 0,
            in_flight: 1,
        }
        .balanced()
    }

    /// An object whose count reached zero is destroyed.
    ///
    /// ```notest
    /// assert_eq!(self.count, 0);
    /// std::mem::drop(self);
    /// ```
    pub fn free(self)
    {
        assert_eq!(self.count, 0, "freeing an object that is still referenced");
        assert_eq!(self.owners + self.held + self.in_flight, 0);
    }

    /// A plain owner adopts a transfer.
    ///
    /// ```notest
    /// self.in_flight -= 1;
    /// self.owners += 1;
    /// ```
    pub fn keep(mut self) -> Self
    {
        assert!(self.in_flight > 0, "nothing in flight to keep");
        self.in_flight -= 1;
        self.owners += 1;
        self.balanced()
    }

    /// A plain owner releases its reference.
    ///
    /// ```notest
    /// self.owners -= 1;
    /// self.count -= 1;
    /// ```
    pub fn release_owner(mut self) -> Self
    {
        assert!(self.owners > 0, "no owner to release");
        self.owners -= 1;
        self.count -= 1;
        self.balanced()
    }

    /// A plain owner's reference is duplicated and handed out in a transfer.
    ///
    /// ```notest
    /// self.count += 1;
    /// self.in_flight += 1;
    /// ```
    pub fn retain_into_transfer(mut self) -> Self
    {
        assert!(self.owners + self.held > 0, "no live reference to duplicate");
        self.count += 1;
        self.in_flight += 1;
        self.balanced()
    }

    /// An unconsumed transfer is dropped, releasing what it carries.
    ///
    /// ```notest
    /// self.in_flight -= 1;
    /// self.count -= 1;
    /// ```
    pub fn drop_transfer(mut self) -> Self
    {
        assert!(self.in_flight > 0, "no transfer to drop");
        self.in_flight -= 1;
        self.count -= 1;
        self.balanced()
    }

    /// The wrapper is constructed or assigned from a live reference and
    /// retains it.
    ///
    /// ```notest
    /// assert_eq!(self.held, 0);
    /// assert!(self.count > 0);
    /// self.held = 1;
    /// self.count += 1;
    /// ```
    ///
    /// Sequencing, the factory scenario: the factory's owner keeps one
    /// reference, the wrapper takes a second, and dropping the wrapper brings
    /// the count back to one.
    ///
    /// ```
    /// let a = owning_nonnull::Axioms::alloc().keep().retain_into_wrapper();
    /// assert_eq!(a.count, 2);
    /// let a = a.drop_wrapper();
    /// assert_eq!(a.count, 1);
    /// a.release_owner().free();
    /// ```
    pub fn retain_into_wrapper(mut self) -> Self
    {
        assert_eq!(self.held, 0, "wrapper already holds this object");
        assert!(self.count > 0, "retaining a dead object");
        self.held = 1;
        self.count += 1;
        self.balanced()
    }

    /// The wrapper adopts a transfer. The count does not move.
    ///
    /// ```notest
    /// self.in_flight -= 1;
    /// self.held = 1;
    /// ```
    ///
    /// Sequencing:
    ///
    /// ```
    /// owning_nonnull::Axioms::alloc()
    ///     .adopt_into_wrapper()
    ///     .forget()
    ///     .adopt_into_wrapper()
    ///     .drop_wrapper()
    ///     .free();
    /// ```
    pub fn adopt_into_wrapper(mut self) -> Self
    {
        assert_eq!(self.held, 0, "wrapper already holds this object");
        assert!(self.in_flight > 0, "nothing in flight to adopt");
        self.in_flight -= 1;
        self.held = 1;
        self.balanced()
    }

    /// The wrapper hands out its reference in a transfer.
    ///
    /// ```notest
    /// self.held = 0;
    /// self.in_flight += 1;
    /// ```
    pub fn forget(mut self) -> Self
    {
        assert_eq!(self.held, 1, "forgetting from an empty wrapper");
        self.held = 0;
        self.in_flight += 1;
        self.balanced()
    }

    /// The wrapper lets go of this object, either because it is dropped or
    /// because it was reassigned to another one.
    ///
    /// ```notest
    /// assert_eq!(self.held, 1);
    /// self.held = 0;
    /// self.count -= 1;
    /// ```
    ///
    /// With these axioms we can show that reassigning a wrapper to the object
    /// it already holds is harmless, because the retain happens before the
    /// release:
    ///
    /// ```
    /// owning_nonnull::Axioms::self_assignment()
    /// ```
    pub fn drop_wrapper(mut self) -> Self
    {
        assert_eq!(self.held, 1, "wrapper does not hold this object");
        self.held = 0;
        self.count -= 1;
        self.balanced()
    }

    /// Retain-then-release on the same object, starting from a wrapper that
    /// holds the only reference.
    ///
    /// The fresh retain is counted as an owner until the old reference is
    /// released, and the count never touches zero in between.
    pub fn self_assignment()
    {
        let held_only = Self::alloc().adopt_into_wrapper();
        assert_eq!(held_only.count, 1);
        let retained = Self {
            count: held_only.count + 1,
            owners: held_only.owners + 1,
            ..held_only
        }
        .balanced();
        let released = retained.drop_wrapper();
        assert!(released.count > 0);
        released.release_owner().free()
    }

    /// Two wrappers exchange objects. From either object's point of view
    /// a held reference stays held, so the state is unchanged.
    pub fn swap(self) -> Self { self.balanced() }

    fn balanced(self) -> Self
    {
        assert!(self.held <= 1, "a wrapper holds at most one reference");
        assert_eq!(
            self.count,
            self.owners + self.held + self.in_flight,
            "reference count out of balance"
        );
        self
    }
}
