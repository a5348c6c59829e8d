//! Character strings.
//!
//! The somewhat ill-named `<character-string>` is defined in [RFC 1035] as
//! binary information of up to 255 octets. As such, it doesn't necessarily
//! contain (ASCII) characters nor is it a string in a Rust sense. On the
//! wire it is encoded as a length octet followed by that many octets of
//! content, so parsing one can never read more than 256 octets.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::wire::ParseError;
use core::{cmp, fmt, hash};
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ CharStr -------------------------------------------------------

/// A DNS character string.
///
/// A character string consists of up to 255 octets of binary data. This
/// type wraps an octets sequence making sure it always complies with that
/// length limit.
#[derive(Clone)]
pub struct CharStr<Octs: ?Sized>(Octs);

impl<Octs> CharStr<Octs> {
    /// Creates a new character string from an octets sequence.
    ///
    /// Returns an error if the octets sequence is longer than 255 octets.
    pub fn from_octets(octets: Octs) -> Result<Self, CharStrError>
    where
        Octs: AsRef<[u8]>,
    {
        if octets.as_ref().len() > 255 {
            Err(CharStrError)
        } else {
            Ok(unsafe { Self::from_octets_unchecked(octets) })
        }
    }

    /// Creates a character string from octets without length check.
    ///
    /// # Safety
    ///
    /// The caller has to make sure that the octets sequence is at most 255
    /// octets long. Otherwise, the behaviour is undefined.
    pub unsafe fn from_octets_unchecked(octets: Octs) -> Self {
        CharStr(octets)
    }

    /// Converts the character string into its underlying octets sequence.
    pub fn into_octets(self) -> Octs {
        self.0
    }
}

impl CharStr<[u8; 0]> {
    /// Creates a new empty character string.
    #[must_use]
    pub fn empty() -> Self {
        CharStr([])
    }
}

impl<Octs: AsRef<[u8]> + ?Sized> CharStr<Octs> {
    /// Returns a reference to a slice of the character string's data.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the length of the character string's data in octets.
    pub fn len(&self) -> usize {
        self.0.as_ref().len()
    }

    /// Returns whether the character string's data is empty.
    pub fn is_empty(&self) -> bool {
        self.0.as_ref().is_empty()
    }
}

/// # Parsing
///
impl<Octs> CharStr<Octs> {
    /// Parses a character string from the beginning of a parser.
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        let len = parser.parse_u8()? as usize;
        parser
            .parse_octets(len)
            .map(|octets| unsafe { Self::from_octets_unchecked(octets) })
            .map_err(Into::into)
    }
}

impl CharStr<()> {
    /// Skips over a character string at the beginning of a parser.
    pub fn skip<Src: AsRef<[u8]> + ?Sized>(
        parser: &mut Parser<Src>,
    ) -> Result<(), ParseError> {
        let len = parser.parse_u8()? as usize;
        parser.advance(len).map_err(Into::into)
    }
}

//--- AsRef

impl<Octs: AsRef<[u8]> + ?Sized> AsRef<[u8]> for CharStr<Octs> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

//--- PartialEq and Eq

impl<Octs, Other> PartialEq<CharStr<Other>> for CharStr<Octs>
where
    Octs: AsRef<[u8]> + ?Sized,
    Other: AsRef<[u8]> + ?Sized,
{
    fn eq(&self, other: &CharStr<Other>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl<Octs: AsRef<[u8]> + ?Sized> Eq for CharStr<Octs> {}

//--- PartialOrd and Ord

impl<Octs, Other> PartialOrd<CharStr<Other>> for CharStr<Octs>
where
    Octs: AsRef<[u8]> + ?Sized,
    Other: AsRef<[u8]> + ?Sized,
{
    fn partial_cmp(&self, other: &CharStr<Other>) -> Option<cmp::Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<Octs: AsRef<[u8]> + ?Sized> Ord for CharStr<Octs> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

//--- Hash

impl<Octs: AsRef<[u8]> + ?Sized> hash::Hash for CharStr<Octs> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

//--- Display and Debug

impl<Octs: AsRef<[u8]> + ?Sized> fmt::Display for CharStr<Octs> {
    /// Formats the character string.
    ///
    /// Printable ASCII characters are written as is, anything else is
    /// escaped as `\DDD` with the decimal value of the octet. Backslashes
    /// and double quotes receive a simple backslash escape so the output
    /// can be used inside a quoted zone file string.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &ch in self.0.as_ref() {
            if ch == b'\\' || ch == b'"' {
                write!(f, "\\{}", ch as char)?;
            } else if (0x20..0x7F).contains(&ch) {
                write!(f, "{}", ch as char)?;
            } else {
                write!(f, "\\{:03}", ch)?;
            }
        }
        Ok(())
    }
}

impl<Octs: AsRef<[u8]> + ?Sized> fmt::Debug for CharStr<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CharStr")
            .field(&format_args!("{}", self))
            .finish()
    }
}

//------------ CharStrError --------------------------------------------------

/// A byte sequence does not represent a valid character string.
///
/// This can only mean that the sequence is longer than 255 octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CharStrError;

impl fmt::Display for CharStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("long character string")
    }
}

impl std::error::Error for CharStrError {}

//============ Testing =======================================================
