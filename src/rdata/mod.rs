//! Record data types.
//!
//! Concrete record data lives in a module per record type. Each type
//! implements the record data traits from [`crate::base::rdata`] so it can
//! be used with the record iterators of [`crate::base::message`].

pub mod naptr;

pub use self::naptr::Naptr;
