//! A single question of a DNS message.

use super::iana::{Class, Rtype};
use super::name::ParsedName;
use super::wire::ParseError;
use core::fmt;
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ Question ------------------------------------------------------

/// A question in a DNS message.
///
/// The question section of a message carries the name, type, and class the
/// query is asking about. In a response the section is simply repeated from
/// the request.
#[derive(Clone, Copy)]
pub struct Question<N> {
    /// The domain name of the question.
    qname: N,

    /// The record type of the question.
    qtype: Rtype,

    /// The class of the question.
    qclass: Class,
}

impl<N> Question<N> {
    /// Creates a new question from its three components.
    pub fn new(qname: N, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Returns a reference to the domain name of the question.
    pub fn qname(&self) -> &N {
        &self.qname
    }

    /// Returns the record type of the question.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the class of the question.
    pub fn qclass(&self) -> Class {
        self.qclass
    }
}

/// # Parsing
///
impl<Octs> Question<ParsedName<Octs>> {
    /// Takes a question from the beginning of a parser.
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        Ok(Question::new(
            ParsedName::parse(parser)?,
            Rtype::parse(parser)?,
            Class::parse(parser)?,
        ))
    }
}

impl Question<()> {
    /// Skips over a question at the beginning of a parser.
    pub fn skip<Src: AsRef<[u8]> + ?Sized>(
        parser: &mut Parser<Src>,
    ) -> Result<(), ParseError> {
        ParsedName::skip(parser)?;
        Rtype::skip(parser)?;
        Class::skip(parser)?;
        Ok(())
    }
}

//--- PartialEq and Eq

impl<N, Other> PartialEq<Question<Other>> for Question<N>
where
    N: PartialEq<Other>,
{
    fn eq(&self, other: &Question<Other>) -> bool {
        self.qname == other.qname
            && self.qtype == other.qtype
            && self.qclass == other.qclass
    }
}

impl<N: Eq> Eq for Question<N> {}

//--- Display and Debug

impl<N: fmt::Display> fmt::Display for Question<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}. {} {}", self.qname, self.qclass, self.qtype)
    }
}

impl<N: fmt::Debug> fmt::Debug for Question<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Question")
            .field("qname", &self.qname)
            .field("qtype", &self.qtype)
            .field("qclass", &self.qclass)
            .finish()
    }
}

//============ Testing =======================================================
