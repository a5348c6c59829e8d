//! Fundamental types for dealing with DNS wire data.
//!
//! Parsing happens on buffers holding a complete DNS message. This is a
//! deliberate choice: domain names inside a message may be compressed by
//! referencing earlier parts of the message, so individual fields cannot be
//! decoded without access to the whole buffer. The cursor into such a
//! buffer is [`octseq::parse::Parser`]; the [wire] module provides the
//! [`Parse`][wire::Parse] trait and the error types on top of it.
//!
//! The [`Message`][message::Message] type wraps the raw octets of a message
//! and allows iterating over its sections. Everything it hands out is
//! validated while being parsed: a successfully returned
//! [`ParsedName`][name::ParsedName] or [`CharStr`][charstr::CharStr] is
//! known to lie entirely within the buffer.

pub mod charstr;
pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod rdata;
pub mod record;
pub mod wire;

pub use self::charstr::CharStr;
pub use self::header::{Header, HeaderCounts, HeaderSection};
pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::message::Message;
pub use self::name::ParsedName;
pub use self::question::Question;
pub use self::rdata::{ParseRecordData, RecordData, UnknownRecordData};
pub use self::record::{ParsedRecord, Record, RecordHeader};
pub use self::wire::{FormError, NameError, Parse, ParseError};
