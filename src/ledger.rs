//! Process-wide registry of live `Counted` allocations.
//!
//! Every `Counted::new` registers its address and type here, and the final
//! release removes it again. Meant for leak hunting and for tests asserting
//! that an object really is gone.

use std::collections::HashMap;

use lazy_static::lazy_static;
use lock_api::MutexGuard;
use parking_lot::{Mutex, RawMutex};

use crate::stats::Stats;

#[derive(Default)]
struct Ledger
{
    live: HashMap<usize, &'static str>,
    allocated: usize,
    destroyed: usize,
}

lazy_static! {
    static ref LEDGER: Mutex<Ledger> = Mutex::new(Ledger::default());
}

fn lock() -> MutexGuard<'static, RawMutex, Ledger> { LEDGER.lock() }

pub(crate) fn register<T>(ptr: *const T, type_name: &'static str)
{
    let mut ledger = lock();
    if ledger.live.insert(ptr as usize, type_name).is_some() {
        panic!("allocation at {:p} registered twice", ptr);
    }
    ledger.allocated += 1;
}

pub(crate) fn unregister<T>(ptr: *const T)
{
    let mut ledger = lock();
    if ledger.live.remove(&(ptr as usize)).is_none() {
        panic!("destroying unregistered allocation at {:p}", ptr);
    }
    ledger.destroyed += 1;
}

/// Whether `ptr` is the address of a live `Counted` allocation.
pub fn is_live<T>(ptr: *const T) -> bool { lock().live.contains_key(&(ptr as usize)) }

/// Snapshot of the ledger.
pub fn stats() -> Stats
{
    let ledger = lock();
    let mut res = Stats {
        allocated: ledger.allocated,
        destroyed: ledger.destroyed,
        ..Stats::default()
    };
    for name in ledger.live.values() {
        *res.live_by_type.entry(*name).or_default() += 1;
    }
    res
}
