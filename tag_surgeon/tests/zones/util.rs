use tag_surgeon::config::{RewriteStrategy, WriteOptions};
use tag_surgeon::error::{Result, SurgeonError};
use tag_surgeon::io::{FileLike, Length, Resize};
use tag_surgeon::structure::{MarkerValue, Zone, ZoneRegistry};
use tag_surgeon::surgeon::{FileSurgeon, RewriteReport, WriteResult};

use std::io::{Cursor, Write as _};

/// The new content of each zone, zones missing or left empty are removed
pub type Contents = [(&'static str, &'static str)];

/// A container with an 8 byte size, a 1 byte item count, and two sized items
///
/// ```text
/// 0        8  9     13      18     22      27
/// [size=10][2][sz=5][aaaaa ][sz=5][bbbbb ]
/// ```
///
/// `zone3` doesn't exist yet, and gets appended at the end of the stream when added.
pub fn container() -> (ZoneRegistry, Cursor<Vec<u8>>) {
	let mut registry = ZoneRegistry::new();
	registry.add_zone("zone1", 13, 5, &[]);
	registry.add_zone("zone2", 22, 5, &[]);
	registry.add_zone("zone3", 27, 0, &[]);

	for zone in ["zone1", "zone2", "zone3"] {
		registry.add_size_marker(zone, 0, MarkerValue::U64(10), true);
		registry.add_counter_marker(zone, 8, MarkerValue::U8(2), true);
	}

	registry.add_size_marker("zone1", 9, MarkerValue::U32(5), true);
	registry.add_size_marker("zone2", 18, MarkerValue::U32(5), true);

	let content = layout(10, 2, &["aaaaa", "bbbbb"]);
	(registry, Cursor::new(content))
}

/// Build the bytes of a [`container()`] holding `items`
pub fn layout(size: u64, count: u8, items: &[&str]) -> Vec<u8> {
	let mut content = Vec::new();
	content.extend(size.to_le_bytes());
	content.push(count);

	for item in items {
		content.extend((item.len() as u32).to_le_bytes());
		content.extend(item.as_bytes());
	}

	content
}

pub fn write_zone(buffer: &mut Cursor<Vec<u8>>, contents: &Contents, zone: &Zone) -> Result<WriteResult> {
	match contents.iter().find(|(name, _)| *name == zone.name()) {
		Some((_, content)) if !content.is_empty() => {
			buffer.write_all(content.as_bytes())?;
			Ok(WriteResult::replace(1))
		},
		_ => Ok(WriteResult::replace(0)),
	}
}

/// Rewrite `zones` of `stream` with `contents`
pub fn rewrite<F>(
	registry: &mut ZoneRegistry,
	stream: &mut F,
	strategy: RewriteStrategy,
	zones: &[&str],
	contents: &Contents,
) -> Result<RewriteReport>
where
	F: FileLike,
	SurgeonError: From<<F as Resize>::Error>,
	SurgeonError: From<<F as Length>::Error>,
{
	FileSurgeon::new(registry, WriteOptions::new().strategy(strategy)).rewrite_zones(
		stream,
		write_zone,
		zones,
		contents,
	)
}

/// Every zone's name, offset, and size, along with its markers' positions and values
pub fn describe(registry: &ZoneRegistry) -> Vec<(String, u64, u64, Vec<(u64, i128)>)> {
	registry
		.zones()
		.map(|zone| {
			let markers = zone
				.markers()
				.iter()
				.map(|marker| (marker.position(), marker.value().get()))
				.collect();

			(zone.name().to_owned(), zone.offset(), zone.size(), markers)
		})
		.collect()
}

/// Assert that every marker in `registry` matches the value stored in `stream`
pub fn assert_markers_in_sync(registry: &ZoneRegistry, stream: &[u8]) {
	for zone in registry.zones() {
		for marker in zone.markers() {
			let mut reader = &stream[marker.position() as usize..];
			let stored =
				MarkerValue::read(&mut reader, marker.value().width(), marker.is_little_endian())
					.unwrap();

			assert_eq!(
				stored,
				marker.value(),
				"marker of `{}` at {} is out of sync",
				zone.name(),
				marker.position()
			);
		}
	}
}
