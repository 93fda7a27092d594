//! Step definitions for provider bridge behaviour tests.

pub mod then;
