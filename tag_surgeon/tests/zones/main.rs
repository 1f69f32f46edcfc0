#![allow(missing_docs)]

mod embedding;
mod failures;
mod scenarios;
pub(crate) mod util;
