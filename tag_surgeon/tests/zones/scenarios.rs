use crate::util::{self, assert_markers_in_sync, container, layout};

use tag_surgeon::config::RewriteStrategy;
use tag_surgeon::structure::{MarkerValue, ZoneAction, ZoneRegistry};

use std::io::Cursor;

#[test_log::test]
fn edit_shrinks_zone() {
	let (mut registry, mut stream) = container();

	let report = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Direct,
		&["zone1"],
		&[("zone1", "aaa")],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), &layout(8, 2, &["aaa", "bbbbb"]));
	assert_eq!(report.changes()[0].action, ZoneAction::Edit);
	assert_eq!(report.size_delta(), -2);

	let zone2 = registry.zone("zone2").unwrap();
	assert_eq!((zone2.offset(), zone2.size()), (20, 5));
	assert_eq!(zone2.markers()[2].position(), 16);
	assert_markers_in_sync(&registry, stream.get_ref());
}

#[test_log::test]
fn delete_zone() {
	let (mut registry, mut stream) = container();

	let report = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Direct,
		&["zone1"],
		&[],
	)
	.unwrap();

	// The item's own size field stays behind, zeroed
	assert_eq!(stream.get_ref(), &layout(5, 1, &["", "bbbbb"]));
	assert_eq!(report.changes()[0].action, ZoneAction::Delete);
	assert!(!registry.zone("zone1").unwrap().is_present());
	assert_eq!(registry.zone("zone2").unwrap().offset(), 17);
	assert_markers_in_sync(&registry, stream.get_ref());
}

#[test_log::test]
fn add_zone() {
	let (mut registry, mut stream) = container();

	let report = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Direct,
		&["zone3"],
		&[("zone3", "ccccc")],
	)
	.unwrap();

	let mut expected = layout(15, 3, &["aaaaa", "bbbbb"]);
	expected.extend(b"ccccc");

	assert_eq!(stream.get_ref(), &expected);
	assert_eq!(report.changes()[0].action, ZoneAction::Add);

	let zone3 = registry.zone("zone3").unwrap();
	assert_eq!((zone3.offset(), zone3.size()), (27, 5));
	assert_markers_in_sync(&registry, stream.get_ref());
}

#[test_log::test]
fn absent_zone_stays_absent() {
	let (mut registry, mut stream) = container();

	let report = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Direct,
		&["zone3"],
		&[],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), &layout(10, 2, &["aaaaa", "bbbbb"]));
	assert_eq!(report.changes()[0].action, ZoneAction::Edit);
	assert_eq!(registry.zone("zone3").unwrap().size(), 0);
}

#[test_log::test]
fn edit_every_zone() {
	let (mut registry, mut stream) = container();

	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Buffered,
		&["zone1", "zone2", "zone3"],
		&[("zone1", "a"), ("zone2", "bbbbbbbbb"), ("zone3", "cc")],
	)
	.unwrap();

	// -4, +4, then +2 and a new item
	let mut expected = layout(12, 3, &["a", "bbbbbbbbb"]);
	expected.extend(b"cc");

	assert_eq!(stream.get_ref(), &expected);
	assert!(registry.markers_at(0).all(|m| m.value().get() == 12));
	assert_markers_in_sync(&registry, stream.get_ref());
}

#[test_log::test]
fn shrink_then_grow_restores_stream() {
	let (mut registry, mut stream) = container();
	let original = stream.get_ref().clone();

	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["zone1", "zone2"],
		&[("zone1", "a"), ("zone2", "")],
	)
	.unwrap();
	assert_eq!(stream.get_ref(), &layout(1, 1, &["a", ""]));

	// Same registry, now describing the shrunk stream
	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["zone1", "zone2"],
		&[("zone1", "aaaaa"), ("zone2", "bbbbb")],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), &original);

	let (fresh, _) = container();
	assert_eq!(util::describe(&registry), util::describe(&fresh));
}

#[test_log::test]
fn big_endian_markers() {
	use std::io::Cursor;
	use tag_surgeon::structure::{MarkerValue, ZoneRegistry};

	// A 2 byte BE size, and a 4 byte BE count shared by both zones
	let mut registry = ZoneRegistry::new();
	registry.add_zone("title", 6, 4, &[]);
	registry.add_zone("artist", 10, 0, &[]);
	for zone in ["title", "artist"] {
		registry.add_size_marker(zone, 0, MarkerValue::U16(8), false);
		registry.add_counter_marker(zone, 2, MarkerValue::U32(1), false);
	}

	let mut stream = Cursor::new(b"\0\x08\0\0\0\x01Song".to_vec());
	util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["title", "artist"],
		&[("title", "Track"), ("artist", "Band")],
	)
	.unwrap();

	assert_eq!(stream.get_ref(), b"\0\x0d\0\0\0\x02TrackBand");
	assert_markers_in_sync(&registry, stream.get_ref());
}

// "RIFF" [size] "WAVE" "LIST" [size] "abcd" "data1234", the LIST zone holding its own size field
fn riff_with_list() -> (ZoneRegistry, Cursor<Vec<u8>>) {
	let mut registry = ZoneRegistry::new();
	registry.add_zone("list", 12, 12, &[]);
	registry.add_size_marker("list", 4, MarkerValue::U32(28), true);
	registry.add_size_marker("list", 16, MarkerValue::U32(4), true);

	let stream = Cursor::new(b"RIFF\x1c\0\0\0WAVELIST\x04\0\0\0abcddata1234".to_vec());
	(registry, stream)
}

#[test_log::test]
fn removed_markers_are_not_written() {
	for strategy in [RewriteStrategy::Direct, RewriteStrategy::Buffered] {
		let (mut registry, mut stream) = riff_with_list();

		util::rewrite(&mut registry, &mut stream, strategy, &["list"], &[]).unwrap();

		assert_eq!(stream.get_ref(), b"RIFF\x10\0\0\0WAVEdata1234");

		// The LIST size field went away with the chunk
		let list = registry.zone("list").unwrap();
		assert_eq!(list.markers().len(), 1);
		assert_eq!(registry.markers_at(16).count(), 0);
		assert_markers_in_sync(&registry, stream.get_ref());
	}
}

// [count] "LIST" [size] "abcd" "tail", where an empty LIST chunk sticks around
fn placeholder_list() -> (ZoneRegistry, Cursor<Vec<u8>>) {
	let mut registry = ZoneRegistry::new();
	registry.add_zone("list", 1, 12, b"LIST\0\0\0\0");
	registry.add_counter_marker("list", 0, MarkerValue::U8(1), true);
	registry.add_size_marker("list", 5, MarkerValue::U32(4), true);

	(registry, Cursor::new(b"\x01LIST\x04\0\0\0abcdtail".to_vec()))
}

#[test_log::test]
fn delete_down_to_core_signature() {
	for strategy in [RewriteStrategy::Direct, RewriteStrategy::Buffered] {
		let (mut registry, mut stream) = placeholder_list();

		let report = util::rewrite(&mut registry, &mut stream, strategy, &["list"], &[]).unwrap();

		assert_eq!(stream.get_ref(), b"\0LIST\0\0\0\0tail");
		assert_eq!(report.changes()[0].action, ZoneAction::Delete);
		assert_eq!(report.size_delta(), -4);

		let list = registry.zone("list").unwrap();
		assert_eq!((list.offset(), list.size()), (1, 8));
		assert!(!list.is_present());
		assert_markers_in_sync(&registry, stream.get_ref());

		// Back from the placeholder, the size field is filled in
		let report = util::rewrite(
			&mut registry,
			&mut stream,
			strategy,
			&["list"],
			&[("list", "LIST\0\0\0\0hello")],
		)
		.unwrap();

		assert_eq!(stream.get_ref(), b"\x01LIST\x05\0\0\0hellotail");
		assert_eq!(report.changes()[0].action, ZoneAction::Add);
		assert!(registry.zone("list").unwrap().is_present());
		assert_markers_in_sync(&registry, stream.get_ref());
	}
}
