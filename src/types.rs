//! Value types wrapping Oracle descriptors and client side representations.
//!
//! All of them share one ownership discipline: values created through this crate own their
//! descriptor and free it on drop; values fetched out of a result set borrow a descriptor the
//! define buffers own.

pub mod collection;
pub mod date;
pub mod interval;
pub mod number;
pub mod object;
pub mod reference;
pub mod timestamp;
pub mod vector;

pub use self::{
    collection::Collection,
    date::Date,
    interval::{Interval, IntervalKind},
    number::Number,
    object::Object,
    reference::Reference,
    timestamp::{Timestamp, TimestampKind},
    vector::{Vector, VectorFormat},
};
