//! Shared fakes for the capture integration tests.

#![allow(dead_code)]

pub mod fakes;
