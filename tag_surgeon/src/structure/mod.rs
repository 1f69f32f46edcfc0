//! The zones and markers describing a stream's layout
//!
//! A *zone* is a named byte range that may be rewritten with content of a different size. A *marker*
//! is a fixed-width integer stored somewhere in the stream that depends on a zone: the size of a chunk,
//! the number of items in a container, or the offset of the zone itself.
//!
//! Codecs register both while parsing, using the values they read from the stream:
//!
//! ```rust
//! use tag_surgeon::structure::{MarkerValue, ZoneRegistry};
//!
//! let mut registry = ZoneRegistry::new();
//!
//! // An APE tag at offset 1024, counted in a header shared by every tag in the file
//! registry.add_zone("ape", 1024, 96, &[]);
//! registry.add_size_marker("ape", 12, MarkerValue::U32(96), true);
//! registry.add_counter_marker("ape", 16, MarkerValue::U16(2), true);
//! ```

mod marker;
mod registry;
mod zone;

pub use marker::{Marker, MarkerKind, MarkerValue, MarkerWidth};
pub use registry::ZoneRegistry;
pub use zone::{InsertionPolicy, Zone, ZoneAction};
