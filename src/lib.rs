//! Defensive decoding of DNS response messages.
//!
//! This crate takes wire-format DNS responses -- byte buffers received from
//! a network socket and therefore arbitrarily truncated or malformed -- and
//! decodes them into structured, owned records. NAPTR records ([RFC 3403])
//! serve as the representative record type.
//!
//! The crate is organized in three layers:
//!
//! * [base] contains the fundamental machinery: the bounds-checked wire
//!   cursor, compressed domain names, character strings, the message header,
//!   and iterators over the sections of a message;
//! * [rdata] contains record data implementations, currently NAPTR;
//! * [reply] contains the caller-facing decode operation
//!   [`parse_naptr_reply`][reply::parse_naptr_reply] which turns a complete
//!   response into an owned list of NAPTR entries, or fails without leaving
//!   any partial output behind.
//!
//! Decoding never reads out of bounds and never panics on untrusted input:
//! every read is checked against the buffer length, compression pointers may
//! only point backwards, and expanded names are capped at 255 octets.
//!
//! Transport concerns -- sockets, retries, matching responses to queries --
//! are deliberately out of scope. Callers hand this crate a byte buffer and
//! consume its structured result.
//!
//! [RFC 3403]: https://www.rfc-editor.org/info/rfc3403

pub use self::reply::{parse_naptr_reply, NaptrEntry, NaptrReply, ReplyError};

pub mod base;
pub mod rdata;
pub mod reply;
