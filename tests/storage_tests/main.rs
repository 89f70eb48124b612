//! Storage Tests
//!
//! Data log and index behavior against real files.
