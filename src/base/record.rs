//! Resource records.
//!
//! A record in a DNS message consists of an envelope carrying the owner
//! name, record type, class, TTL, and the length of the record data,
//! followed by that many octets of data. [`ParsedRecord`] represents a
//! record whose envelope has been decoded but whose data is still in wire
//! format, held behind a parser limited to the data's length. It can be
//! turned into a concrete [`Record`] for any record data type that knows
//! the record's type.

use super::iana::{Class, Rtype};
use super::name::ParsedName;
use super::rdata::ParseRecordData;
use super::wire::ParseError;
use core::fmt;
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ Record --------------------------------------------------------

/// A DNS resource record.
#[derive(Clone)]
pub struct Record<Name, Data> {
    /// The owner of the record.
    owner: Name,

    /// The class of the record.
    class: Class,

    /// The time-to-live value of the record.
    ttl: u32,

    /// The record data. The data also determines the record type.
    data: Data,
}

impl<Name, Data> Record<Name, Data> {
    /// Creates a new record from its parts.
    pub fn new(owner: Name, class: Class, ttl: u32, data: Data) -> Self {
        Record {
            owner,
            class,
            ttl,
            data,
        }
    }

    /// Returns a reference to the owner of the record.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the TTL of the record.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns a reference to the record data.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Trades the record for its record data.
    pub fn into_data(self) -> Data {
        self.data
    }
}

//--- PartialEq and Eq

impl<N, NN, D, DD> PartialEq<Record<NN, DD>> for Record<N, D>
where
    N: PartialEq<NN>,
    D: PartialEq<DD>,
{
    fn eq(&self, other: &Record<NN, DD>) -> bool {
        self.owner == other.owner
            && self.class == other.class
            && self.ttl == other.ttl
            && self.data == other.data
    }
}

impl<N: Eq, D: Eq> Eq for Record<N, D> {}

//--- Display and Debug

impl<Name, Data> fmt::Display for Record<Name, Data>
where
    Name: fmt::Display,
    Data: fmt::Display + super::rdata::RecordData,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}. {} {} {} {}",
            self.owner,
            self.ttl,
            self.class,
            self.data.rtype(),
            self.data
        )
    }
}

impl<Name: fmt::Debug, Data: fmt::Debug> fmt::Debug for Record<Name, Data> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Record")
            .field("owner", &self.owner)
            .field("class", &self.class)
            .field("ttl", &self.ttl)
            .field("data", &self.data)
            .finish()
    }
}

//------------ RecordHeader --------------------------------------------------

/// The envelope of a resource record up to the start of the record data.
#[derive(Clone)]
pub struct RecordHeader<Name> {
    owner: Name,
    rtype: Rtype,
    class: Class,
    ttl: u32,
    rdlen: u16,
}

impl<Name> RecordHeader<Name> {
    /// Creates a new record header from its components.
    pub fn new(
        owner: Name,
        rtype: Rtype,
        class: Class,
        ttl: u32,
        rdlen: u16,
    ) -> Self {
        RecordHeader {
            owner,
            rtype,
            class,
            ttl,
            rdlen,
        }
    }

    /// Returns a reference to the owner of the record.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the record type of the record.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the TTL of the record.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the length of the record data.
    pub fn rdlen(&self) -> u16 {
        self.rdlen
    }

    /// Converts the header into an actual record.
    pub fn into_record<Data>(self, data: Data) -> Record<Name, Data> {
        Record::new(self.owner, self.class, self.ttl, data)
    }
}

/// # Parsing
///
impl<Octs> RecordHeader<ParsedName<Octs>> {
    /// Takes a record header from the beginning of a parser.
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        RecordHeader::parse_ref(parser).map(|hdr| hdr.deref_owner())
    }
}

impl<'a, Octs: AsRef<[u8]> + ?Sized> RecordHeader<ParsedName<&'a Octs>> {
    fn parse_ref(
        parser: &mut Parser<'a, Octs>,
    ) -> Result<Self, ParseError> {
        Ok(RecordHeader::new(
            ParsedName::parse_ref(parser)?,
            Rtype::parse(parser)?,
            Class::parse(parser)?,
            parser.parse_u32_be()?,
            parser.parse_u16_be()?,
        ))
    }
}

impl<'a, Octs: Octets + ?Sized> RecordHeader<ParsedName<&'a Octs>> {
    fn deref_owner(self) -> RecordHeader<ParsedName<Octs::Range<'a>>> {
        RecordHeader {
            owner: self.owner.deref_octets(),
            rtype: self.rtype,
            class: self.class,
            ttl: self.ttl,
            rdlen: self.rdlen,
        }
    }
}

//--- Debug

impl<Name: fmt::Debug> fmt::Debug for RecordHeader<Name> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RecordHeader")
            .field("owner", &self.owner)
            .field("rtype", &self.rtype)
            .field("class", &self.class)
            .field("ttl", &self.ttl)
            .field("rdlen", &self.rdlen)
            .finish()
    }
}

//------------ ParsedRecord --------------------------------------------------

/// A raw record parsed from a message.
///
/// The envelope has been decoded already while the record data is kept
/// behind a parser positioned at its start and limited to its length. The
/// parser still references the complete message so compression pointers
/// inside the record data can be resolved.
#[derive(Clone)]
pub struct ParsedRecord<'a, Octs: Octets + ?Sized> {
    /// The record's envelope.
    header: RecordHeader<ParsedName<&'a Octs>>,

    /// A parser for the record's data.
    data: Parser<'a, Octs>,
}

impl<'a, Octs: Octets + ?Sized> ParsedRecord<'a, Octs> {
    /// Returns a reference to the owner of the record.
    pub fn owner(&self) -> &ParsedName<&'a Octs> {
        self.header.owner()
    }

    /// Returns the record type of the record.
    pub fn rtype(&self) -> Rtype {
        self.header.rtype()
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.header.class()
    }

    /// Returns the TTL of the record.
    pub fn ttl(&self) -> u32 {
        self.header.ttl()
    }

    /// Returns the length of the record data.
    pub fn rdlen(&self) -> u16 {
        self.header.rdlen()
    }
}

impl<'a, Octs: Octets + ?Sized> ParsedRecord<'a, Octs> {
    /// Takes a record from the beginning of a parser.
    ///
    /// The record data is not checked here beyond making sure the message
    /// still contains `rdlen` octets.
    pub fn parse(parser: &mut Parser<'a, Octs>) -> Result<Self, ParseError> {
        let header = RecordHeader::parse_ref(parser)?;
        let data = parser.parse_parser(header.rdlen().into())?;
        Ok(ParsedRecord { header, data })
    }

    /// Skips over a record at the beginning of a parser.
    pub fn skip(parser: &mut Parser<'a, Octs>) -> Result<(), ParseError> {
        ParsedName::skip(parser)?;
        Rtype::skip(parser)?;
        Class::skip(parser)?;
        parser.advance(4)?;
        let rdlen = parser.parse_u16_be()?;
        parser.advance(rdlen.into())?;
        Ok(())
    }

    /// Creates a real record from the parsed record.
    ///
    /// Returns `Ok(None)` if `Data` doesn't know how to handle the
    /// record's type. Otherwise, the record data is decoded and has to
    /// use up the indicated length exactly. Over-reading fails with a
    /// short input error, leftover octets are a format error.
    pub fn to_record<Data>(
        &self,
    ) -> Result<Option<Record<ParsedName<Octs::Range<'a>>, Data>>, ParseError>
    where
        Data: ParseRecordData<'a, Octs>,
    {
        let mut parser = self.data;
        match Data::parse_rdata(self.header.rtype(), &mut parser)? {
            Some(data) => {
                if parser.remaining() > 0 {
                    return Err(ParseError::form_error(
                        "trailing data in record data",
                    ));
                }
                Ok(Some(
                    self.header.clone().deref_owner().into_record(data),
                ))
            }
            None => Ok(None),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::rdata::UnknownRecordData;

    // foo.example MX, class IN, TTL 300, rdlen 2.
    const RECORD: &[u8] = b"\x03foo\x07example\x00\
                            \x00\x0f\x00\x01\
                            \x00\x00\x01\x2c\
                            \x00\x02\x12\x34rest";

    #[test]
    fn parse() {
        let mut parser = Parser::from_ref(RECORD);
        let record = ParsedRecord::parse(&mut parser).unwrap();
        assert_eq!(record.owner().to_string(), "foo.example");
        assert_eq!(record.rtype(), Rtype::MX);
        assert_eq!(record.class(), Class::IN);
        assert_eq!(record.ttl(), 300);
        assert_eq!(record.rdlen(), 2);
        assert_eq!(parser.remaining(), 4);
    }

    #[test]
    fn skip() {
        let mut parser = Parser::from_ref(RECORD);
        ParsedRecord::skip(&mut parser).unwrap();
        assert_eq!(parser.remaining(), 4);
    }

    #[test]
    fn to_record() {
        let mut parser = Parser::from_ref(RECORD);
        let record = ParsedRecord::parse(&mut parser).unwrap();
        let record = record
            .to_record::<UnknownRecordData<_>>()
            .unwrap()
            .unwrap();
        assert_eq!(record.data().data().as_ref(), b"\x12\x34");
    }

    #[test]
    fn truncated_rdata() {
        // rdlen of 6 but only 4 octets follow.
        let mut parser = Parser::from_ref(
            b"\x03foo\x07example\x00\
              \x00\x0f\x00\x01\
              \x00\x00\x01\x2c\
              \x00\x06\x12\x341"
                .as_ref(),
        );
        assert_eq!(
            ParsedRecord::parse(&mut parser).map(|_| ()),
            Err(ParseError::ShortInput)
        );
    }
}
