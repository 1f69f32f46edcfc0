#![no_main]

use std::io::{Cursor, Write};

use libfuzzer_sys::fuzz_target;
use tag_surgeon::config::{RewriteStrategy, WriteOptions};
use tag_surgeon::structure::{MarkerValue, ZoneRegistry};
use tag_surgeon::surgeon::{FileSurgeon, WriteResult};

// [zone offset] [zone size] [marker position] [new size] [strategy] [stream...]
fuzz_target!(|data: Vec<u8>| {
	if data.len() < 5 {
		return;
	}

	let mut registry = ZoneRegistry::new();
	registry.add_zone("zone", u64::from(data[0]), u64::from(data[1]), &[]);
	registry.add_size_marker("zone", u64::from(data[2]), MarkerValue::U8(data[1]), true);
	registry.add_counter_marker("zone", u64::from(data[2]), MarkerValue::U8(1), true);

	let new_size = usize::from(data[3]);
	let strategy = if data[4] % 2 == 0 {
		RewriteStrategy::Direct
	} else {
		RewriteStrategy::Buffered
	};

	let mut stream = Cursor::new(data[5..].to_vec());
	let _ = FileSurgeon::new(&mut registry, WriteOptions::new().strategy(strategy)).rewrite_zones(
		&mut stream,
		|buffer, _: &(), _| {
			buffer.write_all(&vec![0xAA; new_size])?;
			Ok(WriteResult::replace(new_size))
		},
		["zone"],
		&(),
	);
});
