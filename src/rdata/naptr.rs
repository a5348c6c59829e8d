//! Record data from [RFC 3403]: NAPTR records.
//!
//! This RFC defines the NAPTR record type.
//!
//! [RFC 3403]: https://www.rfc-editor.org/info/rfc3403

use crate::base::charstr::CharStr;
use crate::base::iana::Rtype;
use crate::base::name::ParsedName;
use crate::base::rdata::{ParseRecordData, RecordData};
use crate::base::wire::ParseError;
use core::fmt;
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ Naptr ---------------------------------------------------------

/// NAPTR record data.
///
/// NAPTR records encode rules for URI delegation. The record data starts
/// with the order and preference of the rule, followed by three character
/// strings carrying the rule's flags, service parameters, and substitution
/// expression, and finally the replacement domain name.
///
/// The NAPTR record type is defined in [RFC 3403, section 4.1][1].
///
/// [1]: https://www.rfc-editor.org/rfc/rfc3403#section-4.1
#[derive(Clone)]
pub struct Naptr<Octs, Name> {
    order: u16,
    preference: u16,
    flags: CharStr<Octs>,
    services: CharStr<Octs>,
    regexp: CharStr<Octs>,
    replacement: Name,
}

impl Naptr<(), ()> {
    /// The rtype of this record data type.
    pub(crate) const RTYPE: Rtype = Rtype::NAPTR;
}

impl<Octs, Name> Naptr<Octs, Name> {
    /// Creates a new Naptr record data from content.
    pub fn new(
        order: u16,
        preference: u16,
        flags: CharStr<Octs>,
        services: CharStr<Octs>,
        regexp: CharStr<Octs>,
        replacement: Name,
    ) -> Self {
        Naptr {
            order,
            preference,
            flags,
            services,
            regexp,
            replacement,
        }
    }

    /// The order of processing the records is from lowest to highest.
    /// If two records have the same order value, they should be processed
    /// according to their preference value and services field.
    pub fn order(&self) -> u16 {
        self.order
    }

    /// The priority of the DDDS Algorithm, from lowest to highest.
    pub fn preference(&self) -> u16 {
        self.preference
    }

    /// The flags controls aspects of the rewriting and interpretation of
    /// the fields in the record.
    pub fn flags(&self) -> &CharStr<Octs> {
        &self.flags
    }

    /// The services specify the Service Parameters applicable to
    /// this delegation path.
    pub fn services(&self) -> &CharStr<Octs> {
        &self.services
    }

    /// The regexp containing a substitution expression that is
    /// applied to the original string held by the client in order to
    /// construct the next domain name to lookup.
    pub fn regexp(&self) -> &CharStr<Octs> {
        &self.regexp
    }

    /// The replacement is the next domain name to query for,
    /// depending on the potential values found in the flags field.
    pub fn replacement(&self) -> &Name {
        &self.replacement
    }
}

impl<Octs: AsRef<[u8]>> Naptr<Octs, ParsedName<Octs>> {
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(
            parser.parse_u16_be()?,
            parser.parse_u16_be()?,
            CharStr::parse(parser)?,
            CharStr::parse(parser)?,
            CharStr::parse(parser)?,
            ParsedName::parse(parser)?,
        ))
    }
}

//--- PartialEq and Eq

impl<Octs, OtherOcts, Name, OtherName> PartialEq<Naptr<OtherOcts, OtherName>>
    for Naptr<Octs, Name>
where
    Octs: AsRef<[u8]>,
    OtherOcts: AsRef<[u8]>,
    Name: PartialEq<OtherName>,
{
    fn eq(&self, other: &Naptr<OtherOcts, OtherName>) -> bool {
        self.order == other.order
            && self.preference == other.preference
            && self.flags.eq(&other.flags)
            && self.services.eq(&other.services)
            && self.regexp.eq(&other.regexp)
            && self.replacement.eq(&other.replacement)
    }
}

impl<Octs: AsRef<[u8]>, Name: Eq> Eq for Naptr<Octs, Name> {}

//--- RecordData and ParseRecordData

impl<Octs, Name> RecordData for Naptr<Octs, Name> {
    fn rtype(&self) -> Rtype {
        Naptr::RTYPE
    }
}

impl<'a, Octs: Octets + ?Sized> ParseRecordData<'a, Octs>
    for Naptr<Octs::Range<'a>, ParsedName<Octs::Range<'a>>>
{
    fn parse_rdata(
        rtype: Rtype,
        parser: &mut Parser<'a, Octs>,
    ) -> Result<Option<Self>, ParseError> {
        if rtype == Naptr::RTYPE {
            Self::parse(parser).map(Some)
        } else {
            Ok(None)
        }
    }
}

//--- Display and Debug

impl<Octs, Name> fmt::Display for Naptr<Octs, Name>
where
    Octs: AsRef<[u8]>,
    Name: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} \"{}\" \"{}\" \"{}\" {}.",
            self.order,
            self.preference,
            self.flags,
            self.services,
            self.regexp,
            self.replacement
        )
    }
}

impl<Octs, Name> fmt::Debug for Naptr<Octs, Name>
where
    Octs: AsRef<[u8]>,
    Name: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Naptr")
            .field("order", &self.order)
            .field("preference", &self.preference)
            .field("flags", &self.flags)
            .field("services", &self.services)
            .field("regexp", &self.regexp)
            .field("replacement", &self.replacement)
            .finish()
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::wire::NameError;

    // NAPTR record data for a SIP rule, with the replacement name as the
    // last item, preceded by a message fragment it may point back into.
    const FRAGMENT: &[u8] = b"\x07example\x03com\x00\
                              \x00\x64\x00\x32\
                              \x01s\
                              \x07SIP+D2U\
                              \x00\
                              \x04_sip\x04_udp\xc0\x00";

    #[test]
    fn parse() {
        let mut parser = Parser::from_ref(FRAGMENT);
        parser.advance(13).unwrap();
        let naptr = Naptr::parse(&mut parser).unwrap();
        assert_eq!(naptr.order(), 100);
        assert_eq!(naptr.preference(), 50);
        assert_eq!(naptr.flags().as_slice(), b"s");
        assert_eq!(naptr.services().as_slice(), b"SIP+D2U");
        assert!(naptr.regexp().is_empty());
        assert_eq!(
            naptr.replacement().to_string(),
            "_sip._udp.example.com"
        );
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn parse_rejects_other_types() {
        let mut parser = Parser::from_ref(FRAGMENT);
        parser.advance(13).unwrap();
        assert!(matches!(
            Naptr::parse_rdata(Rtype::MX, &mut parser),
            Ok(None)
        ));
    }

    #[test]
    fn parse_truncated() {
        // Record data ends inside the services string.
        let mut parser = Parser::from_ref(&FRAGMENT[..22]);
        parser.advance(13).unwrap();
        assert_eq!(
            Naptr::parse(&mut parser).map(|_| ()),
            Err(ParseError::ShortInput)
        );

        // Record data ends inside the replacement name.
        let mut parser = Parser::from_ref(&FRAGMENT[..30]);
        parser.advance(13).unwrap();
        assert_eq!(
            Naptr::parse(&mut parser).map(|_| ()),
            Err(NameError::ShortInput.into())
        );
    }

    #[test]
    fn display() {
        let mut parser = Parser::from_ref(FRAGMENT);
        parser.advance(13).unwrap();
        let naptr = Naptr::parse(&mut parser).unwrap();
        assert_eq!(
            format!("{}", naptr),
            "100 50 \"s\" \"SIP+D2U\" \"\" _sip._udp.example.com."
        );
    }
}
