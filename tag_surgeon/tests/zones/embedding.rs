use crate::util::{self, assert_markers_in_sync};

use tag_surgeon::config::RewriteStrategy;
use tag_surgeon::error::{ErrorKind, Result};
use tag_surgeon::structure::{InsertionPolicy, MarkerKind, MarkerValue, MarkerWidth, ZoneRegistry};
use tag_surgeon::surgeon::{EmbeddedSizeField, Embedding, EmbeddingHeader};

use std::io::{Cursor, Write};

// An "ID3 " chunk, as found at the end of RIFF files
#[derive(Debug)]
struct Id3Chunk;

impl EmbeddingHeader for Id3Chunk {
	fn header_len(&self) -> u64 {
		8
	}

	fn write_header(&self, writer: &mut dyn Write, payload_len: u64) -> Result<()> {
		writer.write_all(b"ID3 ")?;
		writer.write_all(&(payload_len as u32).to_le_bytes())?;
		Ok(())
	}

	fn size_field(&self) -> Option<EmbeddedSizeField> {
		Some(EmbeddedSizeField {
			offset: 4,
			width: MarkerWidth::U32,
			little_endian: true,
		})
	}
}

// Claims a longer header than it writes
#[derive(Debug)]
struct Broken;

impl EmbeddingHeader for Broken {
	fn header_len(&self) -> u64 {
		8
	}

	fn write_header(&self, writer: &mut dyn Write, _: u64) -> Result<()> {
		writer.write_all(b"ID3 ")?;
		Ok(())
	}
}

fn riff(embedding: Embedding) -> (ZoneRegistry, Cursor<Vec<u8>>) {
	let mut registry = ZoneRegistry::new();
	registry.add_zone("id3", 0, 0, &[]);
	registry.set_insertion_policy("id3", InsertionPolicy::EndOfFile);
	registry.set_embedding("id3", embedding);
	registry.add_size_marker("id3", 4, MarkerValue::U32(4), true);

	(registry, Cursor::new(b"RIFF\x04\0\0\0WAVE".to_vec()))
}

#[test_log::test]
fn wrapper_written_on_creation() {
	let (mut registry, mut stream) = riff(Embedding::wrapper(Id3Chunk));

	let report = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["id3"],
		&[("id3", "TAGDATA")],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), b"RIFF\x13\0\0\0WAVEID3 \x07\0\0\0TAGDATA");
	assert_eq!(report.size_delta(), 15);

	// The zone is the payload alone, the header's size field is now tracked
	let zone = registry.zone("id3").unwrap();
	assert_eq!((zone.offset(), zone.size()), (20, 7));

	let size_field = zone.markers()[1];
	assert_eq!(size_field.kind(), MarkerKind::Size);
	assert_eq!(size_field.position(), 16);
	assert_eq!(size_field.value(), MarkerValue::U32(7));
	assert_markers_in_sync(&registry, stream.get_ref());
}

#[test_log::test]
fn wrapper_not_rewritten_on_edit() {
	let (mut registry, mut stream) = riff(Embedding::wrapper(Id3Chunk));

	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["id3"],
		&[("id3", "TAGDATA")],
	)
	.unwrap();
	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["id3"],
		&[("id3", "TAG")],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), b"RIFF\x0f\0\0\0WAVEID3 \x03\0\0\0TAG");
	assert_markers_in_sync(&registry, stream.get_ref());
}

// The index marker points at the payload, past the wrapper
#[test_log::test]
fn index_marker_skips_wrapper() {
	let mut registry = ZoneRegistry::new();
	registry.add_zone("id3", 0, 0, &[]);
	registry.set_insertion_policy("id3", InsertionPolicy::EndOfFile);
	registry.set_embedding("id3", Embedding::wrapper(Id3Chunk));
	registry.add_size_marker("id3", 4, MarkerValue::U32(8), true);
	registry.add_index_marker("id3", 12, MarkerValue::U32(0), true);

	let mut stream = Cursor::new(b"RIFF\x08\0\0\0WAVE\0\0\0\0".to_vec());

	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["id3"],
		&[("id3", "TAG")],
	)
	.unwrap();
	assert_eq!(
		stream.get_ref(),
		b"RIFF\x13\0\0\0WAVE\x18\0\0\0ID3 \x03\0\0\0TAG"
	);

	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["id3"],
		&[("id3", "TAGS")],
	)
	.unwrap();
	assert_eq!(
		stream.get_ref(),
		b"RIFF\x14\0\0\0WAVE\x18\0\0\0ID3 \x04\0\0\0TAGS"
	);
	assert_eq!(registry.zone("id3").unwrap().offset(), 24);
	assert_markers_in_sync(&registry, stream.get_ref());
}

#[test_log::test]
fn no_wrapper() {
	let (mut registry, mut stream) = riff(Embedding::NoWrapper);

	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["id3"],
		&[("id3", "TAGDATA")],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), b"RIFF\x0b\0\0\0WAVETAGDATA");
}

#[test_log::test]
fn header_length_mismatch() {
	let (mut registry, mut stream) = riff(Embedding::wrapper(Broken));

	let err = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Buffered,
		&["id3"],
		&[("id3", "TAGDATA")],
	)
	.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::SizeMismatch));
	assert_eq!(stream.get_ref(), b"RIFF\x04\0\0\0WAVE");
}
