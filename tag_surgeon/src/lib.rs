//! In-place rewriting of tags and other variable-size regions of binary containers.
//!
//! Most audio containers store their metadata in regions ("zones") whose size is recorded
//! elsewhere in the file: chunk headers, atom sizes, item counts, offset tables. Changing the size
//! of a tag means moving everything after it, and keeping every one of those values in sync.
//!
//! tag_surgeon splits that into three parts:
//!
//! * [`splice`]: grow or shrink a stream at any position, moving its tail
//! * [`structure`]: a registry of zones and the markers that depend on them
//! * [`surgeon`]: rewrites zones with new content, splicing the stream and updating every marker
//!
//! # Examples
//!
//! ## Replacing a tag
//!
//! ```rust
//! # fn main() -> tag_surgeon::error::Result<()> {
//! use std::io::{Cursor, Write};
//! use tag_surgeon::prelude::*;
//!
//! // A container holding a 4 byte little endian size, a 1 byte item count, and a single item
//! let mut stream = Cursor::new(b"\x03\0\0\0\x01abc".to_vec());
//!
//! let mut registry = ZoneRegistry::new();
//! registry.add_zone("comment", 5, 3, &[]);
//! registry.add_size_marker("comment", 0, MarkerValue::U32(3), true);
//! registry.add_counter_marker("comment", 4, MarkerValue::U8(1), true);
//!
//! FileSurgeon::new(&mut registry, WriteOptions::new()).rewrite_zones(
//! 	&mut stream,
//! 	|buffer, comment: &str, _zone| {
//! 		buffer.write_all(comment.as_bytes())?;
//! 		Ok(WriteResult::replace(1))
//! 	},
//! 	["comment"],
//! 	"a longer comment",
//! )?;
//!
//! assert_eq!(&stream.get_ref()[..5], b"\x10\0\0\0\x01");
//! assert_eq!(&stream.get_ref()[5..], b"a longer comment");
//! # Ok(())
//! # }
//! ```
//!
//! ## Removing a tag
//!
//! Reporting zero written fields empties the zone, and decrements the counters depending on it.
//!
//! ```rust
//! # fn main() -> tag_surgeon::error::Result<()> {
//! use std::io::Cursor;
//! use tag_surgeon::prelude::*;
//!
//! let mut stream = Cursor::new(b"\x03\0\0\0\x01abc".to_vec());
//!
//! let mut registry = ZoneRegistry::new();
//! registry.add_zone("comment", 5, 3, &[]);
//! registry.add_size_marker("comment", 0, MarkerValue::U32(3), true);
//! registry.add_counter_marker("comment", 4, MarkerValue::U8(1), true);
//!
//! FileSurgeon::new(&mut registry, WriteOptions::new()).rewrite_zones(
//! 	&mut stream,
//! 	|_, _: &(), _| Ok(WriteResult::replace(0)),
//! 	["comment"],
//! 	&(),
//! )?;
//!
//! assert_eq!(stream.get_ref(), b"\0\0\0\0\0");
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod error;
pub(crate) mod macros;
pub mod splice;
pub mod structure;
pub mod surgeon;
mod util;

pub use util::io;

pub mod prelude {
	//! A prelude for commonly used items in the library.
	//!
	//! This module is intended to be wildcard imported.
	//!
	//! ```rust
	//! use tag_surgeon::prelude::*;
	//! ```

	pub use crate::config::{RewriteStrategy, WriteOptions};
	pub use crate::io::FileLike;
	pub use crate::structure::{MarkerValue, ZoneAction, ZoneRegistry};
	pub use crate::surgeon::{FileSurgeon, WriteMode, WriteResult};
}
