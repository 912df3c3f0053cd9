//! CLI command implementations.

pub(crate) mod filter;
pub(crate) mod include;

pub(crate) use filter::FilterArgs;
pub(crate) use include::IncludeArgs;
