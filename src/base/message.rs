//! Accessing existing DNS messages.
//!
//! [`Message`] wraps an octets sequence containing a DNS message in wire
//! format. It provides access to the header and, through iterators, to the
//! entries of the four sections. Since the sections are of variable length,
//! accessing a later section requires walking over the earlier ones; the
//! iterators do that lazily and surface any wire format problem they run
//! into as an error item.

use super::header::{Header, HeaderCounts, HeaderSection};
use super::name::ParsedName;
use super::question::Question;
use super::rdata::ParseRecordData;
use super::record::{ParsedRecord, Record};
use super::wire::ParseError;
use core::marker::PhantomData;
use core::fmt;
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// The type doesn't validate the message octets beyond checking that the
/// sequence is long enough to contain a header. Everything else is checked
/// on access.
#[derive(Clone)]
pub struct Message<Octs: ?Sized> {
    octets: Octs,
}

impl<Octs: AsRef<[u8]>> Message<Octs> {
    /// Creates a message from an octets sequence.
    ///
    /// This fails if the sequence is shorter than the 12 octet message
    /// header.
    pub fn from_octets(octets: Octs) -> Result<Self, ShortMessage> {
        if octets.as_ref().len() < HeaderSection::LEN {
            Err(ShortMessage)
        } else {
            Ok(Message { octets })
        }
    }
}

impl<Octs: AsRef<[u8]> + ?Sized> Message<Octs> {
    /// Returns a reference to the underlying octets sequence.
    pub fn as_octets(&self) -> &Octs {
        &self.octets
    }

    /// Returns a slice of the message octets.
    pub fn as_slice(&self) -> &[u8] {
        self.octets.as_ref()
    }

    /// Returns a reference to the message header.
    pub fn header(&self) -> &Header {
        Header::for_message_slice(self.as_slice())
    }

    /// Returns a reference to the header counts of the message.
    pub fn header_counts(&self) -> &HeaderCounts {
        HeaderCounts::for_message_slice(self.as_slice())
    }
}

/// # Access to Sections
///
impl<Octs: Octets + ?Sized> Message<Octs> {
    /// Returns an iterator over the question section.
    pub fn question(&self) -> QuestionSection<Octs> {
        let mut parser = Parser::from_ref(&self.octets);
        // The octets are at least header long, so this can't panic.
        parser.advance(HeaderSection::LEN).expect("short message");
        QuestionSection::new(parser)
    }

    /// Returns an iterator over the answer section.
    ///
    /// This iterates over the question section to find the start of the
    /// answer section, so it can fail with a wire format error.
    pub fn answer(&self) -> Result<RecordSection<Octs>, ParseError> {
        self.question().next_section()
    }

    /// Returns an iterator over the authority section.
    pub fn authority(&self) -> Result<RecordSection<Octs>, ParseError> {
        Ok(self.answer()?.next_section()?.expect("no authority section"))
    }

    /// Returns an iterator over the additional section.
    pub fn additional(&self) -> Result<RecordSection<Octs>, ParseError> {
        Ok(self
            .authority()?
            .next_section()?
            .expect("no additional section"))
    }
}

//--- Debug

impl<Octs: AsRef<[u8]> + ?Sized> fmt::Debug for Message<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Message")
            .field("header", self.header())
            .field("counts", self.header_counts())
            .finish()
    }
}

//------------ QuestionSection -----------------------------------------------

/// An iterator over the question section of a DNS message.
///
/// The iterator yields the questions as parsed or an error if a question
/// is broken. After an error, iteration stops.
#[derive(Clone)]
pub struct QuestionSection<'a, Octs: ?Sized> {
    /// A parser positioned at the current question.
    parser: Parser<'a, Octs>,

    /// The remaining number of questions.
    ///
    /// The `Result` is here to monitor an error during iteration. It is
    /// used to fuse the iterator after an error and to portray the error
    /// when trying to proceed to the next section.
    count: Result<u16, ParseError>,
}

impl<'a, Octs: AsRef<[u8]> + ?Sized> QuestionSection<'a, Octs> {
    /// Creates a new question section from a parser.
    ///
    /// The parser must be positioned at the beginning of the question
    /// section of the message it ranges over.
    fn new(parser: Parser<'a, Octs>) -> Self {
        QuestionSection {
            count: Ok(HeaderCounts::for_message_slice(
                parser.octets_ref().as_ref(),
            )
            .qdcount()),
            parser,
        }
    }
}

impl<'a, Octs: Octets + ?Sized> QuestionSection<'a, Octs> {
    /// Proceeds to the answer section.
    ///
    /// Skips over any remaining questions and returns an iterator over
    /// the answer section.
    pub fn next_section(
        mut self,
    ) -> Result<RecordSection<'a, Octs>, ParseError> {
        while let Some(res) = self.next() {
            res?;
        }
        self.count?;
        Ok(RecordSection::new(self.parser, Section::Answer))
    }
}

impl<'a, Octs: Octets + ?Sized> Iterator for QuestionSection<'a, Octs> {
    type Item = Result<Question<ParsedName<Octs::Range<'a>>>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.count {
            Ok(count) if count > 0 => {
                match Question::parse(&mut self.parser) {
                    Ok(question) => {
                        self.count = Ok(count - 1);
                        Some(Ok(question))
                    }
                    Err(err) => {
                        self.count = Err(err);
                        Some(Err(err))
                    }
                }
            }
            _ => None,
        }
    }
}

//------------ Section -------------------------------------------------------

/// A helper type enumerating the three record sections of a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Section {
    Answer,
    Authority,
    Additional,
}

impl Section {
    /// Returns the section following `self`, if any.
    fn next_section(self) -> Option<Self> {
        match self {
            Section::Answer => Some(Section::Authority),
            Section::Authority => Some(Section::Additional),
            Section::Additional => None,
        }
    }

    /// Returns the record count for this section from the header counts.
    fn count(self, counts: &HeaderCounts) -> u16 {
        match self {
            Section::Answer => counts.ancount(),
            Section::Authority => counts.nscount(),
            Section::Additional => counts.arcount(),
        }
    }
}

//------------ RecordSection -------------------------------------------------

/// An iterator over one of the three record sections of a DNS message.
///
/// The iterator yields [`ParsedRecord`]s which only decode the record's
/// envelope. For accessing record data, [`limit_to`][Self::limit_to]
/// converts the iterator into one that decodes the data of a concrete
/// record data type and quietly skips over all other records.
#[derive(Clone)]
pub struct RecordSection<'a, Octs: ?Sized> {
    /// A parser positioned at the current record.
    parser: Parser<'a, Octs>,

    /// Which section is this?
    section: Section,

    /// The remaining number of records or an error that occured.
    count: Result<u16, ParseError>,
}

impl<'a, Octs: AsRef<[u8]> + ?Sized> RecordSection<'a, Octs> {
    /// Creates a new record section.
    ///
    /// The parser must be positioned at the beginning of `section` within
    /// the message it ranges over.
    fn new(parser: Parser<'a, Octs>, section: Section) -> Self {
        RecordSection {
            count: Ok(section.count(HeaderCounts::for_message_slice(
                parser.octets_ref().as_ref(),
            ))),
            section,
            parser,
        }
    }

    /// Returns which of the three record sections this iterates over.
    pub fn section(&self) -> Section {
        self.section
    }
}

impl<'a, Octs: Octets + ?Sized> RecordSection<'a, Octs> {
    /// Trades the iterator for one decoding a concrete record data type.
    ///
    /// The returned iterator yields only records of the types `Data`
    /// knows how to decode and silently skips over all others.
    pub fn limit_to<Data: ParseRecordData<'a, Octs>>(
        self,
    ) -> RecordIter<'a, Octs, Data> {
        RecordIter::new(self)
    }

    /// Proceeds to the next section, if there is one.
    ///
    /// Skips over any remaining records first.
    pub fn next_section(
        mut self,
    ) -> Result<Option<Self>, ParseError> {
        let section = match self.section.next_section() {
            Some(section) => section,
            None => return Ok(None),
        };
        while let Some(res) = self.next() {
            res?;
        }
        self.count?;
        Ok(Some(RecordSection::new(self.parser, section)))
    }
}

impl<'a, Octs: Octets + ?Sized> Iterator for RecordSection<'a, Octs> {
    type Item = Result<ParsedRecord<'a, Octs>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.count {
            Ok(count) if count > 0 => {
                match ParsedRecord::parse(&mut self.parser) {
                    Ok(record) => {
                        self.count = Ok(count - 1);
                        Some(Ok(record))
                    }
                    Err(err) => {
                        self.count = Err(err);
                        Some(Err(err))
                    }
                }
            }
            _ => None,
        }
    }
}

//------------ RecordIter ----------------------------------------------------

/// An iterator over the records of a concrete type in a record section.
#[derive(Clone)]
pub struct RecordIter<'a, Octs: ?Sized, Data> {
    section: RecordSection<'a, Octs>,
    marker: PhantomData<Data>,
}

impl<'a, Octs, Data> RecordIter<'a, Octs, Data>
where
    Octs: Octets + ?Sized,
    Data: ParseRecordData<'a, Octs>,
{
    /// Creates a new record iterator over a section.
    fn new(section: RecordSection<'a, Octs>) -> Self {
        RecordIter {
            section,
            marker: PhantomData,
        }
    }

    /// Trades the iterator for the underlying record section.
    ///
    /// The section will continue right after the last record returned.
    pub fn unwrap(self) -> RecordSection<'a, Octs> {
        self.section
    }
}

impl<'a, Octs, Data> Iterator for RecordIter<'a, Octs, Data>
where
    Octs: Octets + ?Sized,
    Data: ParseRecordData<'a, Octs>,
{
    type Item =
        Result<Record<ParsedName<Octs::Range<'a>>, Data>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.section.next() {
                Some(Ok(record)) => record,
                Some(Err(err)) => return Some(Err(err)),
                None => return None,
            };
            match record.to_record() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

//------------ ShortMessage --------------------------------------------------

/// An octets sequence was too short to even contain a message header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ShortMessage;

impl fmt::Display for ShortMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("short message")
    }
}

impl std::error::Error for ShortMessage {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::{Class, Rtype};
    use crate::base::rdata::UnknownRecordData;

    // A response with one question (example.com IN MX) and two answers.
    const REPLY: &[u8] = b"\x12\x34\x84\x00\x00\x01\x00\x02\x00\x00\x00\x00\
                           \x07example\x03com\x00\x00\x0f\x00\x01\
                           \xc0\x0c\x00\x0f\x00\x01\x00\x00\x01\x2c\
                           \x00\x04\x00\x0a\xc0\x0c\
                           \xc0\x0c\x00\x10\x00\x01\x00\x00\x01\x2c\
                           \x00\x04\x03foo\
                           ";

    #[test]
    fn too_short_for_header() {
        assert_eq!(
            Message::from_octets(&REPLY[..11]).map(|_| ()),
            Err(ShortMessage)
        );
        assert!(Message::from_octets(&REPLY[..12]).is_ok());
    }

    #[test]
    fn header_access() {
        let msg = Message::from_octets(REPLY).unwrap();
        assert_eq!(msg.header().id(), 0x1234);
        assert!(msg.header().qr());
        assert_eq!(msg.header_counts().qdcount(), 1);
        assert_eq!(msg.header_counts().ancount(), 2);
    }

    #[test]
    fn walk_sections() {
        let msg = Message::from_octets(REPLY).unwrap();
        let mut question = msg.question();
        let q = question.next().unwrap().unwrap();
        assert_eq!(q.qname().to_string(), "example.com");
        assert_eq!(q.qtype(), Rtype::MX);
        assert_eq!(q.qclass(), Class::IN);
        assert!(question.next().is_none());

        let mut answer = msg.answer().unwrap();
        let first = answer.next().unwrap().unwrap();
        assert_eq!(first.rtype(), Rtype::MX);
        assert_eq!(first.owner().to_string(), "example.com");
        let second = answer.next().unwrap().unwrap();
        assert_eq!(second.rtype(), Rtype::TXT);
        assert!(answer.next().is_none());
    }

    #[test]
    fn limit_to_skips_other_types() {
        let msg = Message::from_octets(REPLY).unwrap();

        struct Mx;
        impl crate::base::rdata::RecordData for Mx {
            fn rtype(&self) -> Rtype {
                Rtype::MX
            }
        }
        impl<'a, Octs: Octets + ?Sized> ParseRecordData<'a, Octs> for Mx {
            fn parse_rdata(
                rtype: Rtype,
                parser: &mut Parser<'a, Octs>,
            ) -> Result<Option<Self>, ParseError> {
                if rtype != Rtype::MX {
                    return Ok(None);
                }
                parser.advance(parser.remaining())?;
                Ok(Some(Mx))
            }
        }

        let mut iter = msg.answer().unwrap().limit_to::<Mx>();
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().is_none());
    }

    #[test]
    fn broken_question_stops_iteration() {
        // qdcount claims two questions but there is only one.
        let mut octets = REPLY[..29].to_vec();
        octets[5] = 2;
        let msg = Message::from_octets(octets).unwrap();
        let mut question = msg.question();
        assert!(question.next().unwrap().is_ok());
        assert!(question.next().unwrap().is_err());
        assert!(question.next().is_none());
        assert!(msg.answer().is_err());
    }

    #[test]
    fn all_rdata_iteration() {
        let msg = Message::from_octets(REPLY).unwrap();
        let iter = msg
            .answer()
            .unwrap()
            .limit_to::<UnknownRecordData<_>>();
        assert_eq!(iter.count(), 2);
    }
}
