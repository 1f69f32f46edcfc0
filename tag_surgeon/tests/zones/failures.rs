use crate::util::{self, container, layout};

use tag_surgeon::config::{GlobalOptions, RewriteStrategy, WriteOptions, apply_global_options};
use tag_surgeon::error::{ErrorKind, SurgeonError};
use tag_surgeon::structure::{MarkerValue, ZoneRegistry};
use tag_surgeon::surgeon::{FileSurgeon, WriteResult};

use std::io::{Cursor, Write as _};

#[test_log::test]
fn unknown_zone() {
	let (mut registry, mut stream) = container();

	let err = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Auto,
		&["zone1", "zone4"],
		&[("zone1", "a")],
	)
	.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::UnknownZone(name) if name == "zone4"));
	assert_eq!(stream.get_ref(), &layout(10, 2, &["aaaaa", "bbbbb"]));
}

#[test_log::test]
fn buffered_rollback() {
	let (mut registry, mut stream) = container();
	let before = util::describe(&registry);

	let err = FileSurgeon::new(
		&mut registry,
		WriteOptions::new().strategy(RewriteStrategy::Buffered),
	)
	.rewrite_zones(
		&mut stream,
		|buffer, _: &(), zone| {
			if zone.name() == "zone2" {
				return Err(SurgeonError::new(ErrorKind::TooMuchData));
			}

			buffer.write_all(b"a")?;
			Ok(WriteResult::replace(1))
		},
		["zone1", "zone2"],
		&(),
	)
	.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::TooMuchData));

	// zone1 was rewritten in memory only
	assert_eq!(stream.get_ref(), &layout(10, 2, &["aaaaa", "bbbbb"]));
	assert_eq!(util::describe(&registry), before);
}

#[test_log::test]
fn direct_failure_keeps_earlier_zones() {
	let (mut registry, mut stream) = container();

	let err = FileSurgeon::new(
		&mut registry,
		WriteOptions::new().strategy(RewriteStrategy::Direct),
	)
	.rewrite_zones(
		&mut stream,
		|buffer, _: &(), zone| {
			if zone.name() == "zone2" {
				return Err(SurgeonError::new(ErrorKind::TooMuchData));
			}

			buffer.write_all(b"a")?;
			Ok(WriteResult::replace(1))
		},
		["zone1", "zone2"],
		&(),
	)
	.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::TooMuchData));

	// No rollback, the registry still describes the stream
	assert_eq!(stream.get_ref(), &layout(6, 2, &["a", "bbbbb"]));
	assert_eq!(registry.zone("zone2").unwrap().offset(), 18);
}

#[test_log::test]
fn marker_overflow() {
	let mut registry = ZoneRegistry::new();
	registry.add_zone("tag", 1, 3, &[]);
	registry.add_size_marker("tag", 0, MarkerValue::U8(254), true);

	let mut stream = Cursor::new(b"\xfeabc".to_vec());
	let err = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Buffered,
		&["tag"],
		&[("tag", "abcdefgh")],
	)
	.unwrap_err();

	assert!(matches!(err.kind(), ErrorKind::MarkerOverflow { position: 0 }));
	assert_eq!(stream.get_ref(), b"\xfeabc");
}

#[test_log::test]
fn span_over_allocation_limit() {
	let (mut registry, mut stream) = container();

	apply_global_options(GlobalOptions::new().allocation_limit(16));
	let err = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Buffered,
		&["zone1", "zone2"],
		&[("zone1", "a"), ("zone2", "b")],
	)
	.unwrap_err();
	apply_global_options(GlobalOptions::default());

	assert!(matches!(err.kind(), ErrorKind::TooMuchData));

	// Direct rewrites don't stage anything
	apply_global_options(GlobalOptions::new().allocation_limit(16));
	let result = util::rewrite(
		&mut registry,
		&mut stream,
		RewriteStrategy::Direct,
		&["zone1", "zone2"],
		&[("zone1", "a"), ("zone2", "b")],
	);
	apply_global_options(GlobalOptions::default());

	result.unwrap();
	assert_eq!(stream.get_ref(), &layout(2, 2, &["a", "b"]));
}
