/// Snapshot statistics command.
pub mod info;
/// Value rendering command.
pub mod print;
/// Type table listing command.
pub mod types;
/// Shared CLI parsing helpers.
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
