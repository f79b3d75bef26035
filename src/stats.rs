use std::collections::HashMap;

/// Allocation statistics, for diagnosing leaks and the like.
#[derive(Debug, Default, Clone)]
pub struct Stats
{
    /// Live allocations by value type name.
    pub live_by_type: HashMap<&'static str, usize>,

    /// Allocations made since start-up.
    pub allocated: usize,

    /// Allocations destroyed since start-up.
    pub destroyed: usize,
}

impl Stats
{
    /// Number of live allocations.
    pub fn live_objects(&self) -> usize { self.live_by_type.values().sum() }

    /// Number of live allocations holding a value of the named type.
    pub fn live_of(&self, type_name: &str) -> usize
    {
        self.live_by_type.get(type_name).copied().unwrap_or(0)
    }
}
