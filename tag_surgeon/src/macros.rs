macro_rules! try_vec {
	($elem:expr; $size:expr) => {{ $crate::util::alloc::fallible_vec_from_element($elem, $size)? }};
}

// Shorthand for return Err(SurgeonError::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant)          -> return Err(SurgeonError::new(ErrorKind::Variant))
// - err!(Variant(Message)) -> return Err(SurgeonError::new(ErrorKind::Variant(Message)))
// - err!(Variant { .. })   -> return Err(SurgeonError::new(ErrorKind::Variant { .. }))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::SurgeonError::new(
			crate::error::ErrorKind::$variant,
		))
	};
	($variant:ident($reason:expr)) => {
		return Err(crate::error::SurgeonError::new(
			crate::error::ErrorKind::$variant($reason),
		))
	};
	($variant:ident { $($field:ident $(: $value:expr)?),* $(,)? }) => {
		return Err(crate::error::SurgeonError::new(
			crate::error::ErrorKind::$variant { $($field $(: $value)?),* },
		))
	};
}

pub(crate) use {err, try_vec};
