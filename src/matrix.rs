mod dense;

pub use self::dense::*;
