pub mod collect;
pub mod digest;
pub mod summary;

#[cfg(test)]
pub(crate) mod fakes;
