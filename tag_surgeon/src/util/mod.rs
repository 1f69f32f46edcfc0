pub(crate) mod alloc;
pub mod io;
