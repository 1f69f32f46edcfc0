use crate::config::global_options;
use crate::error::Result;
use crate::macros::err;

/// **DO NOT USE DIRECTLY**
///
/// Creates a `Vec` of the specified length, containing copies of `element`, failing instead of
/// aborting if the allocation is refused or goes over `GlobalOptions::allocation_limit`.
///
/// This should be used through [`try_vec!`](crate::macros::try_vec)
pub(crate) fn fallible_vec_from_element<T>(element: T, expected_size: usize) -> Result<Vec<T>>
where
	T: Clone,
{
	let mut v = Vec::new();
	if expected_size == 0 {
		return Ok(v);
	}

	if expected_size > global_options().allocation_limit {
		err!(TooMuchData);
	}

	v.try_reserve_exact(expected_size)?;
	v.resize(expected_size, element);

	Ok(v)
}

/// Converts a stream length or offset into a buffer index
pub(crate) fn buffer_len(len: u64) -> Result<usize> {
	match usize::try_from(len) {
		Ok(len) => Ok(len),
		Err(_) => err!(TooMuchData),
	}
}
