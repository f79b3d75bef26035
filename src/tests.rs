use std::{cell::Cell, rc::Rc};

use crate::*;

fn init_logging() { let _ = env_logger::builder().is_test(true).try_init(); }

struct DropIncrementer(Rc<Cell<i32>>);
impl Drop for DropIncrementer
{
    fn drop(&mut self) { self.0.set(self.0.get() + 1); }
}

fn probe(drops: &Rc<Cell<i32>>) -> Transfer<Counted<DropIncrementer>>
{
    Counted::new(DropIncrementer(drops.clone()))
}

#[test]
fn user_story()
{
    init_logging();
    let drops = Rc::new(Cell::new(0));

    let factory = RefPtr::adopt(probe(&drops));
    assert_eq!(factory.as_ref().unwrap().ref_count(), 1);

    let w = NonNullOwningRef::from_holder(&factory);
    assert_eq!(w.ref_count(), 2);
    assert_eq!(w.as_ptr(), factory.as_ptr());

    drop(w);
    assert_eq!(factory.as_ref().unwrap().ref_count(), 1);
    assert_eq!(drops.get(), 0);

    drop(factory);
    assert_eq!(drops.get(), 1);
}

#[test]
fn construct_from_live_reference_retains()
{
    let owner = RefPtr::adopt(Counted::new(10u32));
    let target = owner.as_ref().unwrap();
    let before = target.ref_count();

    let w = NonNullOwningRef::new(target);
    assert_eq!(w.ref_count(), before + 1);
    assert_eq!(w.as_ptr(), target as *const Counted<u32>);

    let v: NonNullOwningRef<Counted<u32>> = target.into();
    assert_eq!(v.ref_count(), before + 2);
}

#[test]
fn construct_from_raw_pointer_retains()
{
    let owner = RefPtr::adopt(Counted::new(10u32));
    let w = unsafe { NonNullOwningRef::from_raw(owner.as_ptr()) };
    assert_eq!(w.ref_count(), 2);
    assert_eq!(w.as_ptr(), owner.as_ptr());
}

#[test]
fn adopting_a_transfer_does_not_retain()
{
    let t = Counted::new(String::from("adopted"));
    let raw = t.as_ptr();
    let before = unsafe { (*raw).ref_count() };

    let w = NonNullOwningRef::adopt(t);
    assert_eq!(w.as_ptr(), raw);
    assert_eq!(w.ref_count(), before);
    assert_eq!(w.as_str(), "adopted");

    let v: NonNullOwningRef<Counted<u8>> = Counted::new(1u8).into();
    assert_eq!(v.ref_count(), 1);
}

#[test]
fn forget_hands_out_the_held_reference()
{
    let mut w = NonNullOwningRef::adopt(Counted::new(5i32));
    let held = w.as_ptr();

    let t = w.forget();
    assert_eq!(t.as_ptr(), held);

    let back = RefPtr::adopt(t);
    assert_eq!(back.as_ref().unwrap().ref_count(), 1);

    w.set_from_holder(&back);
    assert_eq!(w.ref_count(), 2);
}

#[test]
fn reassignment_releases_old_exactly_once()
{
    let drops = Rc::new(Cell::new(0));
    let first = RefPtr::adopt(probe(&drops));
    let second = RefPtr::adopt(probe(&drops));

    let mut w = NonNullOwningRef::from_holder(&first);
    assert_eq!(first.as_ref().unwrap().ref_count(), 2);

    w.set(second.as_ref().unwrap());
    assert_eq!(first.as_ref().unwrap().ref_count(), 1);
    assert_eq!(second.as_ref().unwrap().ref_count(), 2);

    let third = probe(&drops);
    let third_ptr = third.as_ptr();
    w.set_transfer(third);
    assert_eq!(second.as_ref().unwrap().ref_count(), 1);
    assert_eq!(w.as_ptr(), third_ptr);
    assert_eq!(w.ref_count(), 1);

    unsafe { w.set_raw(first.as_ptr()) };
    assert_eq!(drops.get(), 1);
    assert_eq!(first.as_ref().unwrap().ref_count(), 2);

    drop(w);
    drop((first, second));
    assert_eq!(drops.get(), 3);
}

#[test]
fn self_assignment_keeps_the_object_alive()
{
    let drops = Rc::new(Cell::new(0));
    let mut w = NonNullOwningRef::adopt(probe(&drops));
    let raw = w.as_ptr();

    unsafe { w.set_raw(raw) };
    assert_eq!(drops.get(), 0);
    assert_eq!(w.ref_count(), 1);
}

#[test]
fn swap_is_count_neutral()
{
    let mut a = NonNullOwningRef::adopt(Counted::new('a'));
    let mut b = NonNullOwningRef::adopt(Counted::new('b'));
    let (pa, pb) = (a.get(), b.get());

    a.swap(&mut b);
    assert_eq!(a.get(), pb);
    assert_eq!(b.get(), pa);
    assert_eq!(**a, 'b');
    assert_eq!((a.ref_count(), b.ref_count()), (1, 1));

    let mut p = RefPtr::adopt(Counted::new('p'));
    let pp = p.as_ptr();
    a.swap_ptr(&mut p);
    assert_eq!(a.as_ptr(), pp);
    assert_eq!(p.as_ptr(), pb.as_ptr() as *const Counted<char>);
    assert_eq!((a.ref_count(), p.as_ref().unwrap().ref_count()), (1, 1));
}

#[test]
fn clone_retains()
{
    let a = NonNullOwningRef::adopt(Counted::new(0u64));
    let b = a.clone();
    assert!(NonNullOwningRef::ptr_eq(&a, &b));
    assert_eq!(a.ref_count(), 2);
    drop(b);
    assert_eq!(a.ref_count(), 1);
}

#[test]
fn traversal_reports_the_held_pointer_once()
{
    init_logging();
    let w = NonNullOwningRef::adopt(Counted::new(1i32));
    let mut rec = EdgeRecorder::default();

    w.traverse(&mut rec, "Node", "mChild", TraverseFlags::from_bits(8));

    assert_eq!(
        rec.edges(),
        [Edge {
            owner: "Node".to_owned(),
            field: "mChild".to_owned(),
            flags: TraverseFlags::from_bits(8),
            child: w.get().cast(),
        }]
    );
}

#[test]
fn traversal_of_collections()
{
    let kids = vec![
        NonNullOwningRef::adopt(Counted::new(1i32)),
        NonNullOwningRef::adopt(Counted::new(2i32)),
    ];
    let maybe: Option<RefPtr<Counted<i32>>> = Some(RefPtr::null());
    let mut rec = EdgeRecorder::default();

    kids.traverse(&mut rec, "List", "mKids", TraverseFlags::NONE);
    maybe.traverse(&mut rec, "List", "mMaybe", TraverseFlags::NONE);

    assert_eq!(rec.edges().len(), 2);
    assert!(rec
        .edges_of("List")
        .all(|e| e.flags.contains(TraverseFlags::ARRAY_ELEMENT)));
    assert_eq!(rec.edges()[1].child, kids[1].get().cast());
}

#[test]
fn sibling_interop_both_ways()
{
    let w = NonNullOwningRef::adopt(Counted::new(3u8));

    let p: RefPtr<Counted<u8>> = (&w).into();
    assert_eq!(p.as_ptr(), w.as_ptr());
    assert_eq!(w.ref_count(), 2);

    let mut q = RefPtr::<Counted<u8>>::null();
    q.set_from_holder(&w);
    assert_eq!(w.ref_count(), 3);

    let back = NonNullOwningRef::<Counted<u8>>::try_from(q).unwrap();
    assert_eq!(back.ref_count(), 3);

    let moved: RefPtr<Counted<u8>> = back.into();
    assert_eq!(moved.as_ref().unwrap().ref_count(), 3);
}

#[test]
fn empty_sibling_is_rejected_at_the_boundary()
{
    let empty = RefPtr::<Counted<u8>>::null();
    let err = NonNullOwningRef::<Counted<u8>>::try_from(empty).unwrap_err();
    assert_eq!(
        err,
        Error::Null {
            type_name: std::any::type_name::<Counted<u8>>()
        }
    );
    assert!(err.to_string().contains("Counted<u8>"));
}

#[test]
fn unconsumed_transfer_releases_on_drop()
{
    let drops = Rc::new(Cell::new(0));
    let t = probe(&drops);
    drop(t);
    assert_eq!(drops.get(), 1);
}

#[test]
fn debug_output()
{
    let w = NonNullOwningRef::<Counted<i32>>::uninit();
    assert_eq!(format!("{:?}", w), "NonNullOwningRef(<uninitialized>)");

    let w = NonNullOwningRef::adopt(Counted::new(0i32));
    assert_eq!(format!("{:p}", w), format!("{:p}", w.as_ptr()));
}

/// Drive a wrapper through a sequence of operations and check the target's
/// count against the bookkeeping model after every step.
#[test]
fn bookkeeping_matches_axioms()
{
    let drops = Rc::new(Cell::new(0));

    let mut model = Axioms::alloc();
    let t = probe(&drops);
    let target = t.as_ptr();
    let count = || unsafe { (*target).ref_count() };
    assert_eq!(count(), model.count);

    let owner = RefPtr::adopt(t);
    model = model.keep();
    assert_eq!(count(), model.count);

    let mut w = NonNullOwningRef::from_holder(&owner);
    model = model.retain_into_wrapper();
    assert_eq!(count(), model.count);

    let mut other = NonNullOwningRef::adopt(Counted::new(DropIncrementer(drops.clone())));
    w.swap(&mut other);
    other.swap(&mut w);
    model = model.swap();
    assert_eq!(count(), model.count);

    let t = w.forget();
    model = model.forget();
    assert_eq!(count(), model.count);

    w.set_transfer(t);
    model = model.adopt_into_wrapper();
    assert_eq!(count(), model.count);

    w.set_from_holder(&other);
    model = model.drop_wrapper();
    assert_eq!(count(), model.count);

    let t = RefPtr::from_holder(&owner).forget();
    model = model.retain_into_transfer();
    assert_eq!(count(), model.count);

    drop(t);
    model = model.drop_transfer();
    assert_eq!(count(), model.count);

    drop(owner);
    model.release_owner().free();
    assert_eq!(drops.get(), 1);
}

#[cfg(any(debug_assertions, feature = "checked"))]
mod checked
{
    use super::*;

    #[test]
    #[should_panic(expected = "used before initialization")]
    fn get_before_initialization()
    {
        let w = NonNullOwningRef::<Counted<i32>>::default();
        w.get();
    }

    #[test]
    #[should_panic(expected = "used before initialization")]
    fn deref_before_initialization()
    {
        let w = NonNullOwningRef::<Counted<i32>>::uninit();
        let _value: i32 = **w;
    }

    #[test]
    #[should_panic(expected = "used before initialization")]
    fn get_after_forget()
    {
        let mut w = NonNullOwningRef::adopt(Counted::new(1i32));
        let _t = w.forget();
        w.get();
    }

    #[test]
    #[should_panic(expected = "forgotten before initialization")]
    fn forget_twice()
    {
        let mut w = NonNullOwningRef::adopt(Counted::new(1i32));
        let _t = w.forget();
        let _u = w.forget();
    }

    #[test]
    #[should_panic(expected = "assigned a null pointer")]
    fn null_raw_pointer()
    {
        let _ = unsafe { NonNullOwningRef::<Counted<i32>>::from_raw(std::ptr::null()) };
    }

    #[test]
    #[should_panic(expected = "assigned a null transfer")]
    fn null_transfer()
    {
        let _ = NonNullOwningRef::adopt(Transfer::<Counted<i32>>::null());
    }

    #[test]
    #[should_panic(expected = "already consumed")]
    fn consumed_transfer()
    {
        let mut t = Counted::new(1i32);
        let _first = RefPtr::adopt(unsafe { Transfer::from_raw(t.as_ptr()) });
        t.take();
        let _ = NonNullOwningRef::adopt(t);
    }

    #[test]
    #[should_panic(expected = "swapped with a null RefPtr")]
    fn swap_in_null()
    {
        let mut w = NonNullOwningRef::adopt(Counted::new(1i32));
        w.swap_ptr(&mut RefPtr::null());
    }

    #[test]
    #[should_panic(expected = "empty holder")]
    fn empty_holder()
    {
        let _ = NonNullOwningRef::from_holder(&RefPtr::<Counted<i32>>::null());
    }
}
