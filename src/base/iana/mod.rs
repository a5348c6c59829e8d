//! IANA definitions for DNS.
//!
//! This module contains types for the parameters defined in IANA registries
//! that are relevant for this crate. They all follow the same basic
//! structure: a wrapper around the raw integer with the well-defined values
//! available as associated constants. Since undefined values can appear on
//! the wire, the full set of possible integers is always accepted; a
//! well-defined constant and a raw value created from the same integer
//! compare equal.
//!
//! While each parameter type has a module of its own, they are all
//! re-exported here.

#[macro_use]
mod macros;

pub mod class;
pub mod opcode;
pub mod rcode;
pub mod rtype;

pub use self::class::Class;
pub use self::opcode::Opcode;
pub use self::rcode::Rcode;
pub use self::rtype::Rtype;
