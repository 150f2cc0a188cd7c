//! Scatter-gather descriptor lists.
//!
//! A [`ScatterGatherList`] describes a logically contiguous byte range as a chain of
//! physically-addressed [`Descriptor`]s, none of which crosses a page boundary except possibly
//! the first. Lists are built from a buffer with [`map()`], bytes are moved between two lists
//! with [`copy()`], and lists are released with [`destroy()`].
#![no_std]

extern crate alloc;

mod copy;
mod destroy;
mod list;
mod map;

pub use copy::copy;
pub use destroy::{DestroyReport, destroy};
pub use list::{Descriptor, Iter, ScatterGatherList};
pub use map::{MapError, map, try_map};
