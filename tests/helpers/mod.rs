mod assert;

pub use assert::assert;
