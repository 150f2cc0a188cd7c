//! Abstractions over physical and buffer addresses, their translation, and raw byte access.
#![no_std]

extern crate alloc;

pub mod access;
pub mod address;
pub mod translation;
