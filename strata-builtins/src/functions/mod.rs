//! Whitelisted builtin functions

mod math;
mod aggregate;
mod convert;
mod sequence;

pub use math::{Abs, Divmod, Pow, Round};
pub use aggregate::{All, Any, Len, Max, Min, Sorted, Sum};
pub use convert::{Bin, Bool, Chr, Dict, Float, Hex, Int, List, Oct, Ord, Set, Str, Tuple, Type};
pub use sequence::{Enumerate, Range, Reversed, Zip};
