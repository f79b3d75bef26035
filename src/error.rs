/// Failure to cross from an optional reference to a non-null one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error
{
    #[error("expected a non-null reference to {type_name}, found none")]
    Null { type_name: &'static str },
}
