//! Generic test bodies shared by every index implementation.
//!
//! Integration tests under `tests/` instantiate these per structure.
