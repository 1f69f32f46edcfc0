use super::marker::Marker;
use crate::surgeon::Embedding;

/// Where a zone that doesn't exist yet gets created
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InsertionPolicy {
	/// At the offset the zone was registered with
	#[default]
	BuiltIn,
	/// At the very start of the stream
	StartOfFile,
	/// At the very end of the stream
	EndOfFile,
}

/// How a zone's stored markers are affected by a rewrite
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ZoneAction {
	/// The zone existed before the rewrite, and still does
	Edit,
	/// The zone was absent, and now has content
	Add,
	/// The zone had content, and is now absent
	Delete,
}

/// A named, contiguous byte range of a stream that can be rewritten
///
/// Zones are created through [`ZoneRegistry::add_zone`](crate::structure::ZoneRegistry::add_zone).
#[derive(Clone, Debug)]
pub struct Zone {
	pub(crate) name: String,
	pub(crate) offset: u64,
	pub(crate) size: u64,
	pub(crate) core_signature: Vec<u8>,
	pub(crate) markers: Vec<Marker>,
	pub(crate) insertion: InsertionPolicy,
	pub(crate) embedding: Embedding,
}

impl Zone {
	pub(crate) fn new(name: String, offset: u64, size: u64, core_signature: Vec<u8>) -> Self {
		Self {
			name,
			offset,
			size,
			core_signature,
			markers: Vec::new(),
			insertion: InsertionPolicy::default(),
			embedding: Embedding::default(),
		}
	}

	/// The zone's unique name
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The current offset of the zone in the stream
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// The current size of the zone
	pub fn size(&self) -> u64 {
		self.size
	}

	/// The bytes written in place of the zone's content when it becomes empty
	///
	/// Some containers need a chunk header to stick around, even with nothing in it.
	pub fn core_signature(&self) -> &[u8] {
		&self.core_signature
	}

	/// The markers that follow this zone's size
	pub fn markers(&self) -> &[Marker] {
		&self.markers
	}

	/// Where the zone gets created if it doesn't exist yet
	pub fn insertion_policy(&self) -> InsertionPolicy {
		self.insertion
	}

	/// The envelope written around the zone when it's created
	pub fn embedding(&self) -> &Embedding {
		&self.embedding
	}

	/// Whether the zone holds anything more than its core signature
	///
	/// # Examples
	///
	/// ```rust
	/// use tag_surgeon::structure::ZoneRegistry;
	///
	/// let mut registry = ZoneRegistry::new();
	/// registry.add_zone("info", 12, 8, b"LIST\0\0\0\0");
	/// registry.add_zone("id3", 20, 128, &[]);
	///
	/// assert!(!registry.zone("info").unwrap().is_present());
	/// assert!(registry.zone("id3").unwrap().is_present());
	/// ```
	pub fn is_present(&self) -> bool {
		self.size > self.core_signature.len() as u64
	}

	pub(crate) fn end(&self) -> u64 {
		self.offset.saturating_add(self.size)
	}
}
