#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use tag_surgeon::splice::{lengthen, shorten};

fuzz_target!(|data: Vec<u8>| {
	if data.len() < 3 {
		return;
	}

	let offset = u64::from(data[0]) % data.len() as u64;
	let delta = u64::from(data[1]);
	let buffer_size = usize::from(data[2]);

	let mut stream = Cursor::new(data.clone());
	if lengthen(&mut stream, offset, delta, true, buffer_size).is_err() {
		return;
	}

	shorten(&mut stream, offset + delta, delta, buffer_size).unwrap();
	assert_eq!(stream.into_inner(), data);
});
