//! Domain names parsed from a DNS message.
//!
//! In an attempt to keep messages small, DNS uses a procedure called 'name
//! compression.' It tries to minimize the space used for repeatedly
//! appearing domain names by simply refering to the first occurence of the
//! name. This works not only for complete names but also for suffixes. In
//! this case, the first unique labels of the name are included and then a
//! pointer is included for the remainder of the name.
//!
//! A consequence of this is that the labels of a name can be scattered all
//! over the message. [`ParsedName`] deals with such names: it holds a
//! reference to the underlying message and, when being created via
//! [`parse`][ParsedName::parse], quickly walks over the name to check that
//! it is, indeed, valid. While this does take a bit of time, it spares you
//! having to deal with possible errors later on: iterating over the labels
//! of a successfully parsed name cannot fail.
//!
//! Because the input is untrusted, walking the name is heavily guarded:
//! every label read is bounds-checked, a compression pointer must target an
//! offset strictly before the pointer itself, and the expanded name must
//! stay within the 255 octet limit of [RFC 1035]. Together these guarantee
//! termination even for adversarial inputs.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::wire::{NameError, ParseError};
use core::{cmp, fmt};
use octseq::octets::Octets;
use octseq::parse::Parser;

//------------ ParsedName ----------------------------------------------------

/// A domain name parsed from a DNS message.
#[derive(Clone, Copy)]
pub struct ParsedName<Octs> {
    /// The octets the name is embedded in.
    ///
    /// This needs to be the full message as compression pointers in the
    /// name are indexes into this sequence.
    octets: Octs,

    /// The start position of the name within `octets`.
    pos: usize,

    /// The length of the uncompressed name in octets.
    name_len: u16,

    /// Whether the name is compressed.
    compressed: bool,
}

impl<Octs> ParsedName<Octs> {
    /// Returns whether the name is compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Returns whether the name is the root label only.
    pub fn is_root(&self) -> bool {
        self.name_len == 1
    }

    /// Returns the length of the uncompressed name in octets.
    pub fn name_len(&self) -> u16 {
        self.name_len
    }

    /// Returns an equivalent name for a reference to the contained octets.
    pub fn ref_octets(&self) -> ParsedName<&Octs> {
        ParsedName {
            octets: &self.octets,
            pos: self.pos,
            name_len: self.name_len,
            compressed: self.compressed,
        }
    }
}

impl<'a, Octs: Octets + ?Sized> ParsedName<&'a Octs> {
    pub fn deref_octets(&self) -> ParsedName<Octs::Range<'a>> {
        ParsedName {
            octets: self.octets.range(..),
            pos: self.pos,
            name_len: self.name_len,
            compressed: self.compressed,
        }
    }
}

/// # Working with Labels
///
impl<Octs: AsRef<[u8]>> ParsedName<Octs> {
    /// Returns an iterator over the labels of the name.
    pub fn iter(&self) -> ParsedNameIter {
        ParsedNameIter::new(self.octets.as_ref(), self.pos, self.name_len)
    }

    /// Returns the number of labels in the name.
    pub fn label_count(&self) -> usize {
        self.iter().count()
    }

    /// Returns whether this name and `other` are the same name.
    ///
    /// Domain names compare ignoring ASCII case, label by label.
    pub fn name_eq<Other: AsRef<[u8]>>(
        &self,
        other: &ParsedName<Other>,
    ) -> bool {
        let mut me = self.iter();
        let mut other = other.iter();
        loop {
            match (me.next(), other.next()) {
                (Some(left), Some(right)) => {
                    if left != right {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

/// # Parsing
///
impl<Octs> ParsedName<Octs> {
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, ParseError> {
        ParsedName::parse_ref(parser).map(|res| res.deref_octets())
    }
}

impl<'a, Octs: AsRef<[u8]> + ?Sized> ParsedName<&'a Octs> {
    pub fn parse_ref(
        parser: &mut Parser<'a, Octs>,
    ) -> Result<Self, ParseError> {
        let mut name_len = 0;
        let mut pos = parser.pos();

        // Phase One: No compression pointers have been found yet.
        //
        // Parse labels. If we encounter the root label, return an
        // uncompressed name. Otherwise continue to phase two.
        let mut ptr = loop {
            match LabelType::parse(parser)? {
                LabelType::Normal(0) => {
                    // Root label.
                    name_len += 1;
                    return Ok(ParsedName {
                        octets: parser.octets_ref(),
                        pos,
                        name_len,
                        compressed: false,
                    });
                }
                LabelType::Normal(label_len) => {
                    parser
                        .advance(usize::from(label_len))
                        .map_err(|_| NameError::ShortInput)?;
                    name_len += label_len + 1;
                    if name_len >= 255 {
                        return Err(NameError::LongName.into());
                    }
                }
                LabelType::Compressed(ptr) => {
                    break ptr;
                }
            }
        };

        // Phase Two: Compression has occured.
        //
        // Now we need to add up label lengths until we encounter the root
        // label or the name becomes too long.
        //
        // From here on the caller's parser must not move: it has already
        // reached the end of the name's first occurence. We work on a copy
        // instead so we can jump around freely. (Parsers are Copy, so
        // dereferencing clones the parser.)
        let mut parser = *parser;
        let mut compressed = true;
        loop {
            // Pointers must point strictly backwards. Because the current
            // position is right behind the two pointer octets, the target
            // needs to be less than the current position minus two. 'Less'
            // so a pointer cannot point to itself.
            if ptr >= parser.pos() - 2 {
                return Err(NameError::ExcessiveCompression.into());
            }

            // If this is the first label, the returned name may as well
            // start here.
            if name_len == 0 {
                pos = ptr;
                compressed = false;
            }

            // Reposition and read the next labels.
            parser.seek(ptr).map_err(|_| NameError::ShortInput)?;

            loop {
                match LabelType::parse(&mut parser)? {
                    LabelType::Normal(0) => {
                        // Root label.
                        name_len += 1;
                        return Ok(ParsedName {
                            octets: parser.octets_ref(),
                            pos,
                            name_len,
                            compressed,
                        });
                    }
                    LabelType::Normal(label_len) => {
                        parser
                            .advance(usize::from(label_len))
                            .map_err(|_| NameError::ShortInput)?;
                        name_len += label_len + 1;
                        if name_len >= 255 {
                            return Err(NameError::LongName.into());
                        }
                    }
                    LabelType::Compressed(new_ptr) => {
                        ptr = new_ptr;
                        compressed = true;
                        break;
                    }
                }
            }
        }
    }
}

impl ParsedName<()> {
    /// Skips over a domain name.
    ///
    /// This will only check the uncompressed part of the name. If the name
    /// is compressed but the compression pointer is invalid or the name
    /// pointed to is invalid or too long, the function will still succeed.
    ///
    /// If you need to check that the name you are skipping over is valid,
    /// you will have to use `parse` and drop the result.
    pub fn skip<Src: AsRef<[u8]> + ?Sized>(
        parser: &mut Parser<Src>,
    ) -> Result<(), ParseError> {
        let mut len = 0;
        loop {
            match LabelType::parse(parser)? {
                LabelType::Normal(0) => {
                    len += 1;
                    if len > 255 {
                        return Err(NameError::LongName.into());
                    }
                    return Ok(());
                }
                LabelType::Normal(label_len) => {
                    parser
                        .advance(label_len.into())
                        .map_err(|_| NameError::ShortInput)?;
                    len += label_len + 1;
                    if len > 255 {
                        return Err(NameError::LongName.into());
                    }
                }
                LabelType::Compressed(_) => return Ok(()),
            }
        }
    }
}

//--- PartialEq and Eq

impl<Octs, Other> PartialEq<ParsedName<Other>> for ParsedName<Octs>
where
    Octs: AsRef<[u8]>,
    Other: AsRef<[u8]>,
{
    fn eq(&self, other: &ParsedName<Other>) -> bool {
        self.name_eq(other)
    }
}

impl<Octs: AsRef<[u8]>> Eq for ParsedName<Octs> {}

//--- IntoIterator

impl<'a, Octs: AsRef<[u8]>> IntoIterator for &'a ParsedName<Octs> {
    type Item = Label<'a>;
    type IntoIter = ParsedNameIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//--- Display and Debug

impl<Octs: AsRef<[u8]>> fmt::Display for ParsedName<Octs> {
    /// Formats the domain name.
    ///
    /// This will produce the domain name in common display format without
    /// the trailing dot.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut iter = self.iter();
        match iter.next() {
            Some(label) => write!(f, "{}", label)?,
            None => return Ok(()),
        }
        for label in iter {
            if !label.is_root() {
                write!(f, ".{}", label)?
            }
        }
        Ok(())
    }
}

impl<Octs: AsRef<[u8]>> fmt::Debug for ParsedName<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParsedName({}.)", self)
    }
}

//------------ ParsedNameIter ------------------------------------------------

/// An iterator over the labels in a parsed domain name.
#[derive(Clone)]
pub struct ParsedNameIter<'a> {
    slice: &'a [u8],
    pos: usize,
    len: u16,
}

impl<'a> ParsedNameIter<'a> {
    /// Creates a new iterator over a name in a message slice.
    ///
    /// The pair of `pos` and `len` must point at a name that has been
    /// validated before; the iterator assumes all label heads and pointers
    /// are well-formed and in bounds.
    pub(crate) fn new(slice: &'a [u8], pos: usize, len: u16) -> Self {
        ParsedNameIter { slice, pos, len }
    }

    /// Returns the next label.
    fn get_label(&mut self) -> Label<'a> {
        let end = loop {
            let ltype = self.slice[self.pos];
            self.pos += 1;
            match ltype {
                0..=0x3F => break self.pos + (ltype as usize),
                0xC0..=0xFF => {
                    self.pos = (self.slice[self.pos] as usize)
                        | (((ltype as usize) & 0x3F) << 8);
                }
                _ => panic!("bad label"),
            }
        };
        let res = Label(&self.slice[self.pos..end]);
        self.pos = end;
        self.len -= res.name_len();
        res
    }
}

impl<'a> Iterator for ParsedNameIter<'a> {
    type Item = Label<'a>;

    fn next(&mut self) -> Option<Label<'a>> {
        if self.len == 0 {
            return None;
        }
        Some(self.get_label())
    }
}

//------------ Label ---------------------------------------------------------

/// A label of a domain name.
///
/// Labels are between zero and 63 octets of arbitrary binary data. The
/// empty label is the root label. Labels compare ignoring ASCII case.
#[derive(Clone, Copy)]
pub struct Label<'a>(&'a [u8]);

impl<'a> Label<'a> {
    /// Returns the root label.
    #[must_use]
    pub fn root() -> Self {
        Label(b"")
    }

    /// Returns a reference to the underlying octets.
    pub fn as_slice(&self) -> &'a [u8] {
        self.0
    }

    /// Returns the length of the label in octets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the label is empty, i.e., the root label.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the label is the root label.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the length the label takes up in an uncompressed name.
    ///
    /// This is the length of the content plus the length octet.
    pub fn name_len(&self) -> u16 {
        self.0.len() as u16 + 1
    }

    /// Returns the number of characters the label takes up when displayed.
    ///
    /// Unusual octets are escaped when displaying, so this can be longer
    /// than the label itself.
    pub fn display_len(&self) -> usize {
        self.0.iter().map(|&ch| escaped_len(ch)).sum()
    }
}

/// Returns the number of characters needed to display the octet `ch`.
fn escaped_len(ch: u8) -> usize {
    if ch == b'.' || ch == b'\\' {
        2
    } else if (0x20..0x7F).contains(&ch) {
        1
    } else {
        4
    }
}

//--- PartialEq and Eq

impl<'a, 'o> PartialEq<Label<'o>> for Label<'a> {
    fn eq(&self, other: &Label<'o>) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl<'a> PartialEq<[u8]> for Label<'a> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl<'a> Eq for Label<'a> {}

//--- PartialOrd and Ord

impl<'a, 'o> PartialOrd<Label<'o>> for Label<'a> {
    fn partial_cmp(&self, other: &Label<'o>) -> Option<cmp::Ordering> {
        self.0
            .iter()
            .map(u8::to_ascii_lowercase)
            .partial_cmp(other.0.iter().map(u8::to_ascii_lowercase))
    }
}

impl<'a> Ord for Label<'a> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.0
            .iter()
            .map(u8::to_ascii_lowercase)
            .cmp(other.0.iter().map(u8::to_ascii_lowercase))
    }
}

//--- Display and Debug

impl<'a> fmt::Display for Label<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &ch in self.0 {
            if ch == b'.' || ch == b'\\' {
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

impl<'a> fmt::Debug for Label<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Label")
            .field(&format_args!("{}", self))
            .finish()
    }
}

//------------ LabelType -----------------------------------------------------

/// The type of a label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LabelType {
    /// A normal label with its size in octets.
    Normal(u16),

    /// A compressed label with the position of where to continue.
    Compressed(usize),
}

impl LabelType {
    /// Attempts to take a label type from the beginning of `parser`.
    ///
    /// All failures, including simply running out of input, are name
    /// errors: the label head is part of the name being decoded.
    pub fn parse<Octs: AsRef<[u8]> + ?Sized>(
        parser: &mut Parser<Octs>,
    ) -> Result<Self, ParseError> {
        let ltype = parser.parse_u8().map_err(|_| NameError::ShortInput)?;
        match ltype {
            0..=0x3F => Ok(LabelType::Normal(ltype.into())),
            0xC0..=0xFF => {
                let res = usize::from(
                    parser.parse_u8().map_err(|_| NameError::ShortInput)?,
                );
                let res = res | ((usize::from(ltype) & 0x3F) << 8);
                Ok(LabelType::Compressed(res))
            }
            _ => Err(NameError::BadLabel.into()),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    // The test names use a message fragment carrying www.example.com in
    // various states of compression.
    macro_rules! name {
        (root) => {
            name!(b"123\0", 3, 1, false)
        };
        (flat) => {
            name!(b"\x03www\x07example\x03com\0\xc0\0", 0, 17, false)
        };
        (copy) => {
            name!(b"\x03www\x07example\x03com\0\xc0\0", 17, 17, false)
        };
        (once) => {
            name!(b"\x03com\0\x03www\x07example\xC0\0", 5, 17, true)
        };
        (twice) => {
            name!(b"\x03com\0\x07example\xc0\0\x03www\xc0\x05", 15, 17, true)
        };

        ($bytes:expr, $start:expr, $len:expr, $compressed:expr) => {
            ParsedName {
                octets: $bytes.as_ref(),
                pos: $start,
                name_len: $len,
                compressed: $compressed,
            }
        };
    }

    fn p(slice: &[u8], pos: usize) -> Parser<[u8]> {
        let mut res = Parser::from_ref(slice);
        res.advance(pos).unwrap();
        res
    }

    fn cmp_iter(iter: ParsedNameIter, labels: &[&[u8]]) {
        let labels = labels.iter();
        for (label, expected) in iter.zip(labels) {
            assert_eq!(label.as_slice(), *expected);
        }
    }

    #[test]
    fn name_len() {
        assert_eq!(name!(root).name_len(), 1);
        assert_eq!(name!(flat).name_len(), 17);
        assert_eq!(name!(once).name_len(), 17);
        assert_eq!(name!(twice).name_len(), 17);
    }

    #[test]
    fn is_compressed() {
        assert!(!name!(root).is_compressed());
        assert!(!name!(flat).is_compressed());
        assert!(name!(once).is_compressed());
        assert!(name!(twice).is_compressed());
    }

    #[test]
    fn iter() {
        let labels: &[&[u8]] = &[b"www", b"example", b"com", b""];
        cmp_iter(name!(root).iter(), &[b""]);
        cmp_iter(name!(flat).iter(), labels);
        cmp_iter(name!(once).iter(), labels);
        cmp_iter(name!(twice).iter(), labels);
    }

    #[test]
    fn eq() {
        assert_eq!(name!(flat), name!(once));
        assert_eq!(name!(flat), name!(twice));
        assert_eq!(name!(once), name!(twice));
        assert_ne!(name!(root), name!(flat));
    }

    #[test]
    fn display() {
        assert_eq!(name!(root).to_string(), "");
        assert_eq!(name!(flat).to_string(), "www.example.com");
        assert_eq!(name!(twice).to_string(), "www.example.com");
    }

    #[test]
    fn parse_and_skip() {
        fn name_eq(parsed: ParsedName<&[u8]>, expected: ParsedName<&[u8]>) {
            assert_eq!(parsed.octets, expected.octets);
            assert_eq!(parsed.pos, expected.pos);
            assert_eq!(parsed.name_len, expected.name_len);
            assert_eq!(parsed.compressed, expected.compressed);
        }

        fn parse(
            name: ParsedName<&[u8]>,
            equals: ParsedName<&[u8]>,
            wire_len: usize,
        ) {
            let mut parser = p(name.octets, name.pos);
            let end = parser.pos() + wire_len;
            name_eq(ParsedName::parse_ref(&mut parser).unwrap(), equals);
            assert_eq!(parser.pos(), end);
        }

        fn skip(name: ParsedName<&[u8]>, wire_len: usize) {
            let mut parser = p(name.octets, name.pos);
            let pos = parser.pos();
            assert_eq!(ParsedName::skip(&mut parser), Ok(()));
            assert_eq!(parser.pos(), pos + wire_len);
        }

        // Correctly formatted names. The cursor must end up right after
        // the first occurence of the name, not after a pointer target.
        parse(name!(root), name!(root), 1);
        parse(name!(flat), name!(flat), 17);
        parse(name!(copy), name!(flat), 2);
        parse(name!(once), name!(once), 14);
        parse(name!(twice), name!(twice), 6);
        skip(name!(root), 1);
        skip(name!(flat), 17);
        skip(name!(copy), 2);
        skip(name!(once), 14);
        skip(name!(twice), 6);

        // Short buffer in the middle of a label.
        let mut parser = p(b"\x03www\x07exam", 0);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::ShortInput.into())
        );
        assert_eq!(
            ParsedName::skip(&mut parser),
            Err(NameError::ShortInput.into())
        );

        // Short buffer at end of label.
        let mut parser = p(b"\x03www\x07example", 0);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::ShortInput.into())
        );
        assert_eq!(
            ParsedName::skip(&mut parser),
            Err(NameError::ShortInput.into())
        );

        // Compression pointer beyond the end of buffer.
        let mut parser = p(b"\x03www\xc0\xee12", 0);
        assert!(ParsedName::parse_ref(&mut parser.clone()).is_err());
        assert_eq!(ParsedName::skip(&mut parser), Ok(()));
        assert_eq!(parser.remaining(), 2);

        // Compression pointer to itself.
        assert_eq!(
            ParsedName::parse_ref(&mut p(b"\x03www\xc0\x0412", 4)),
            Err(NameError::ExcessiveCompression.into())
        );

        // Compression pointer forward.
        assert_eq!(
            ParsedName::parse_ref(&mut p(b"\x03www\xc0\x0612", 4)),
            Err(NameError::ExcessiveCompression.into())
        );

        // Bad label header.
        let mut parser = p(b"\x03www\x07example\xbffoo", 0);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::BadLabel.into())
        );
        assert_eq!(
            ParsedName::skip(&mut parser),
            Err(NameError::BadLabel.into())
        );

        // Long name: 255 bytes is fine.
        let mut buf = Vec::from(&b"\x03123\0"[..]);
        for _ in 0..25 {
            buf.extend_from_slice(b"\x09123456789");
        }
        buf.extend_from_slice(b"\xc0\x0012");
        let mut parser = p(buf.as_slice(), 5);
        let name = ParsedName::parse_ref(&mut parser.clone()).unwrap();
        assert_eq!(name.name_len(), 255);
        assert_eq!(ParsedName::skip(&mut parser), Ok(()));
        assert_eq!(parser.remaining(), 2);

        // Long name: 256 bytes are bad.
        let mut buf = Vec::from(&b"\x041234\x00"[..]);
        for _ in 0..25 {
            buf.extend_from_slice(b"\x09123456789");
        }
        buf.extend_from_slice(b"\xc0\x0012");
        let mut parser = p(buf.as_slice(), 6);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::LongName.into())
        );
        assert_eq!(ParsedName::skip(&mut parser), Ok(()));
        assert_eq!(parser.remaining(), 2);

        // Long name through recursion.
        let mut parser = p(b"\x03www\xc0\x0012", 0);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::LongName.into())
        );
        assert_eq!(ParsedName::skip(&mut parser), Ok(()));
        assert_eq!(parser.remaining(), 2);

        // Single-step infinite recursion.
        let mut parser = p(b"\xc0\x0012", 0);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::ExcessiveCompression.into())
        );
        assert_eq!(ParsedName::skip(&mut parser), Ok(()));
        assert_eq!(parser.remaining(), 2);

        // Two-step infinite recursion.
        let mut parser = p(b"\xc0\x02\xc0\x0012", 2);
        assert_eq!(
            ParsedName::parse_ref(&mut parser.clone()),
            Err(NameError::ExcessiveCompression.into())
        );
        assert_eq!(ParsedName::skip(&mut parser), Ok(()));
        assert_eq!(parser.remaining(), 2);
    }

    #[test]
    fn display_escaping() {
        let labels: [&[u8]; 2] = [b"a.b", b"\x01\xff"];
        assert_eq!(Label(labels[0]).to_string(), "a\\.b");
        assert_eq!(Label(labels[0]).display_len(), 4);
        assert_eq!(Label(labels[1]).to_string(), "\\001\\255");
        assert_eq!(Label(labels[1]).display_len(), 8);
    }
}
