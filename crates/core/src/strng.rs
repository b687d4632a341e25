//! A cheap-to-clone, interned-friendly string type used everywhere a request or
//! response passes a string through translator state. Backed by `arcstr::ArcStr`,
//! which makes `.clone()` an atomic refcount bump rather than a byte copy.

pub type Strng = arcstr::ArcStr;

/// Build a `Strng` from a `&'static str` with no allocation, usable in `const` position
/// (e.g. `const NAME: Strng = strng::literal!("aws.bedrock");`).
#[macro_export]
macro_rules! __strng_literal {
	($s:expr) => {
		::arcstr::literal!($s)
	};
}
pub use __strng_literal as literal;

/// Build a `Strng` via `format!`-style interpolation.
#[macro_export]
macro_rules! __strng_format {
	($($arg:tt)*) => {
		$crate::strng::new(::std::format!($($arg)*))
	};
}
pub use __strng_format as format;

pub fn new(s: impl AsRef<str>) -> Strng {
	Strng::from(s.as_ref())
}
