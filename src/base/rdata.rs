//! Resource record data.
//!
//! Each record type defines the layout of its record data on the wire.
//! The [`RecordData`] trait ties a Rust type to its record type while
//! [`ParseRecordData`] is implemented by types that can be created from
//! the record data of a parsed record. The latter allows a type to decline
//! a record type it doesn't understand, in which case the record can still
//! be represented through [`UnknownRecordData`], which simply keeps the
//! raw data.

use super::iana::Rtype;
use super::wire::ParseError;
use core::fmt;
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ RecordData ----------------------------------------------------

/// A type that represents record data.
pub trait RecordData {
    /// Returns the record type associated with this record data instance.
    fn rtype(&self) -> Rtype;
}

//------------ ParseRecordData -----------------------------------------------

/// A record data type that can be parsed from a message.
///
/// When record data is parsed, the record type is known from the record's
/// envelope. `parse_rdata` receives that type and a parser positioned at
/// the start of the record data and limited to its length. It returns
/// `Ok(None)` if the implementation doesn't know how to handle `rtype`.
pub trait ParseRecordData<'a, Octs: ?Sized>: RecordData + Sized {
    /// Parses the record data.
    ///
    /// If `Ok(None)` is returned, the parser may be positioned anywhere;
    /// the caller is responsible for skipping over the data.
    fn parse_rdata(
        rtype: Rtype,
        parser: &mut Parser<'a, Octs>,
    ) -> Result<Option<Self>, ParseError>;
}

//------------ UnknownRecordData ---------------------------------------------

/// A type carrying the record data of any record type.
///
/// The data is kept in its raw wire format. Display uses the generic
/// record data format of [RFC 3597].
///
/// [RFC 3597]: https://tools.ietf.org/html/rfc3597
#[derive(Clone)]
pub struct UnknownRecordData<Octs> {
    /// The record type of this data.
    rtype: Rtype,

    /// The record data.
    data: Octs,
}

impl<Octs> UnknownRecordData<Octs> {
    /// Creates generic record data from the raw data and a record type.
    pub fn from_octets(rtype: Rtype, data: Octs) -> Self {
        UnknownRecordData { rtype, data }
    }

    /// Returns a reference to the raw record data.
    pub fn data(&self) -> &Octs {
        &self.data
    }
}

//--- RecordData and ParseRecordData

impl<Octs> RecordData for UnknownRecordData<Octs> {
    fn rtype(&self) -> Rtype {
        self.rtype
    }
}

impl<'a, Octs: Octets + ?Sized> ParseRecordData<'a, Octs>
    for UnknownRecordData<Octs::Range<'a>>
{
    fn parse_rdata(
        rtype: Rtype,
        parser: &mut Parser<'a, Octs>,
    ) -> Result<Option<Self>, ParseError> {
        let rdlen = parser.remaining();
        parser
            .parse_octets(rdlen)
            .map(|data| Some(Self::from_octets(rtype, data)))
            .map_err(Into::into)
    }
}

//--- PartialEq and Eq

impl<Octs, Other> PartialEq<UnknownRecordData<Other>>
    for UnknownRecordData<Octs>
where
    Octs: AsRef<[u8]>,
    Other: AsRef<[u8]>,
{
    fn eq(&self, other: &UnknownRecordData<Other>) -> bool {
        self.rtype == other.rtype
            && self.data.as_ref() == other.data.as_ref()
    }
}

impl<Octs: AsRef<[u8]>> Eq for UnknownRecordData<Octs> {}

//--- Display and Debug

impl<Octs: AsRef<[u8]>> fmt::Display for UnknownRecordData<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let data = self.data.as_ref();
        write!(f, "\\# {}", data.len())?;
        for ch in data {
            write!(f, " {:02x}", ch)?
        }
        Ok(())
    }
}

impl<Octs: AsRef<[u8]>> fmt::Debug for UnknownRecordData<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("UnknownRecordData")
            .field(&format_args!("{}", self))
            .finish()
    }
}

//============ Testing =======================================================
