//! Decoding complete NAPTR responses.
//!
//! This module provides the high-level entry point of the crate:
//! [`parse_naptr_reply`] takes the raw octets of a DNS response message and
//! returns the NAPTR records from its answer section as an owned list of
//! [`NaptrEntry`] values. The message is validated along the way: it must
//! carry exactly one question, and every answer record must be well-formed
//! even if it is of a type other than NAPTR.
//!
//! All data is copied out of the message, so the returned [`NaptrReply`]
//! does not borrow the input buffer. Copying means allocating, and every
//! allocation is treated as fallible: if one fails, everything built so far
//! is released and the call reports [`ReplyError::OutOfMemory`] with no
//! partial output.

use crate::base::message::Message;
use crate::base::name::{Label, ParsedName};
use crate::base::wire::ParseError;
use crate::rdata::Naptr;
use core::fmt;

//------------ parse_naptr_reply ---------------------------------------------

/// Parses the NAPTR records from a DNS response message.
///
/// The message is expected to occupy the first `len` octets of `msg`. A
/// negative `len` or one exceeding the buffer length is rejected as a bad
/// response without looking at the buffer at all.
pub fn parse_naptr_reply(
    msg: &[u8],
    len: isize,
) -> Result<NaptrReply, ReplyError> {
    let len = match usize::try_from(len) {
        Ok(len) if len <= msg.len() => len,
        _ => return Err(ReplyError::BadResponse),
    };
    NaptrReply::parse(&msg[..len])
}

//------------ NaptrReply ----------------------------------------------------

/// The NAPTR records of a response message.
///
/// The records are kept as a singly-linked chain of [`NaptrEntry`] values
/// in answer order. The chain is exclusively owned by this value and is
/// released when it is dropped or [`clear`][Self::clear]ed. Dropping
/// releases the chain iteratively, so even absurdly long replies will not
/// overflow the stack.
#[derive(Default)]
pub struct NaptrReply {
    head: Option<Box<NaptrEntry>>,
}

impl NaptrReply {
    /// Parses the NAPTR records from the octets of a response message.
    ///
    /// The message must carry exactly one question. A structurally broken
    /// message is a [`ReplyError::BadResponse`], a broken compressed name
    /// inside an otherwise fine message a [`ReplyError::BadName`]. If the
    /// message has no answer records at all, the result is
    /// [`ReplyError::NoData`]. Answer records of other types are skipped,
    /// so a message whose answers are all of unrelated types produces an
    /// empty reply, not an error.
    ///
    /// Answers are matched by record type only. The owner name of an
    /// answer is not checked against the question name; callers that need
    /// stricter matching have to compare names themselves.
    pub fn parse(octets: &[u8]) -> Result<Self, ReplyError> {
        let msg = Message::from_octets(octets)
            .map_err(|_| ReplyError::BadResponse)?;
        if msg.header_counts().qdcount() != 1 {
            return Err(ReplyError::BadResponse);
        }
        let answer = msg.answer().map_err(ReplyError::from_parse)?;
        if msg.header_counts().ancount() == 0 {
            return Err(ReplyError::NoData);
        }

        // Collect into a vec first and only convert into the linked
        // chain once the whole message has decoded. This way a failure
        // halfway through never leaves a partially built chain around.
        let mut entries = Vec::new();
        for record in answer.limit_to::<Naptr<_, _>>() {
            let record = record.map_err(ReplyError::from_parse)?;
            let entry = NaptrEntry::from_rdata(record.data())?;
            reserve_one(&mut entries)?;
            entries.push(entry);
        }

        // Boxing happens before the entry is linked up. Should it fail,
        // the chain built so far still hangs off `reply` alone and gets
        // released through its iterative drop.
        let mut reply = NaptrReply::default();
        while let Some(entry) = entries.pop() {
            let mut entry = try_box(entry)?;
            entry.next = reply.head.take();
            reply.head = Some(entry);
        }
        Ok(reply)
    }

    /// Returns whether the reply contains no records.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the number of records in the reply.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns an iterator over the records of the reply.
    pub fn iter(&self) -> Iter {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Releases all records of the reply, leaving it empty.
    ///
    /// This is a no-op on an empty reply. It is also the only place that
    /// ever frees entries: `Drop` goes through here, too.
    pub fn clear(&mut self) {
        let mut next = self.head.take();
        while let Some(mut entry) = next {
            next = entry.next.take();
        }
    }
}

//--- Drop

impl Drop for NaptrReply {
    fn drop(&mut self) {
        self.clear()
    }
}

//--- IntoIterator

impl<'a> IntoIterator for &'a NaptrReply {
    type Item = &'a NaptrEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//--- Debug

impl fmt::Debug for NaptrReply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

//------------ Iter ----------------------------------------------------------

/// An iterator over the entries of a [`NaptrReply`].
#[derive(Clone)]
pub struct Iter<'a> {
    next: Option<&'a NaptrEntry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a NaptrEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        self.next = entry.next.as_deref();
        Some(entry)
    }
}

//------------ NaptrEntry ----------------------------------------------------

/// A single decoded NAPTR record.
///
/// The flags, service, and regexp fields are byte strings since character
/// strings may carry arbitrary binary data. The replacement name is
/// rendered into presentation format with unusual octets escaped, so it is
/// always valid UTF-8.
pub struct NaptrEntry {
    order: u16,
    preference: u16,
    flags: Vec<u8>,
    service: Vec<u8>,
    regexp: Vec<u8>,
    replacement: String,
    next: Option<Box<NaptrEntry>>,
}

impl NaptrEntry {
    /// Creates an entry by copying the fields out of parsed record data.
    fn from_rdata<Octs, NOcts>(
        rdata: &Naptr<Octs, ParsedName<NOcts>>,
    ) -> Result<Self, ReplyError>
    where
        Octs: AsRef<[u8]>,
        NOcts: AsRef<[u8]>,
    {
        Ok(NaptrEntry {
            order: rdata.order(),
            preference: rdata.preference(),
            flags: try_bytes(rdata.flags().as_slice())?,
            service: try_bytes(rdata.services().as_slice())?,
            regexp: try_bytes(rdata.regexp().as_slice())?,
            replacement: try_name(rdata.replacement())?,
            next: None,
        })
    }

    /// Returns the order of the record.
    pub fn order(&self) -> u16 {
        self.order
    }

    /// Returns the preference of the record.
    pub fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the content of the flags field.
    pub fn flags(&self) -> &[u8] {
        &self.flags
    }

    /// Returns the content of the service field.
    pub fn service(&self) -> &[u8] {
        &self.service
    }

    /// Returns the content of the regexp field.
    pub fn regexp(&self) -> &[u8] {
        &self.regexp
    }

    /// Returns the replacement name in presentation format.
    ///
    /// The name comes without a trailing dot; the root name is the empty
    /// string.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Returns the next entry of the reply, if there is one.
    ///
    /// Entries appear in the order of the answer section.
    pub fn next(&self) -> Option<&NaptrEntry> {
        self.next.as_deref()
    }
}

//--- Debug

impl fmt::Debug for NaptrEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NaptrEntry")
            .field("order", &self.order)
            .field("preference", &self.preference)
            .field("flags", &self.flags)
            .field("service", &self.service)
            .field("regexp", &self.regexp)
            .field("replacement", &self.replacement)
            .finish()
    }
}

//------------ ReplyError ----------------------------------------------------

/// An error happened while decoding a response message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyError {
    /// The message violates the wire format.
    ///
    /// This covers everything structural: a buffer too short for a
    /// required field, a question count other than one, or record data
    /// that doesn't use up its declared length exactly.
    BadResponse,

    /// A compressed domain name inside the message is broken.
    BadName,

    /// The message is fine but has no answer records at all.
    NoData,

    /// An allocation failed while building the reply.
    ///
    /// All partially built output has been released before this is
    /// reported.
    OutOfMemory,
}

impl ReplyError {
    /// Maps a wire parse error onto a reply error.
    fn from_parse(err: ParseError) -> Self {
        match err {
            ParseError::Name(_) => ReplyError::BadName,
            _ => ReplyError::BadResponse,
        }
    }
}

//--- Display and Error

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReplyError::BadResponse => f.write_str("malformed response"),
            ReplyError::BadName => f.write_str("malformed domain name"),
            ReplyError::NoData => f.write_str("no data in response"),
            ReplyError::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

impl std::error::Error for ReplyError {}

//============ Fallible Allocation ===========================================

/// Checks with the test harness whether this allocation should fail.
///
/// Outside of tests this is a no-op: the `try_reserve` calls in the
/// helpers below are then the only source of allocation failures.
fn alloc_guard() -> Result<(), ReplyError> {
    #[cfg(test)]
    {
        if alloc_fail::should_fail() {
            return Err(ReplyError::OutOfMemory);
        }
    }
    Ok(())
}

/// Copies a slice into an owned byte vector.
fn try_bytes(slice: &[u8]) -> Result<Vec<u8>, ReplyError> {
    alloc_guard()?;
    let mut res = Vec::new();
    res.try_reserve_exact(slice.len())
        .map_err(|_| ReplyError::OutOfMemory)?;
    res.extend_from_slice(slice);
    Ok(res)
}

/// Renders a parsed name into an owned presentation format string.
fn try_name<Octs: AsRef<[u8]>>(
    name: &ParsedName<Octs>,
) -> Result<String, ReplyError> {
    alloc_guard()?;
    let mut len = 0;
    let mut labels = 0usize;
    for label in name.iter() {
        if !label.is_root() {
            len += label.display_len();
            labels += 1;
        }
    }
    len += labels.saturating_sub(1); // separating dots
    let mut res = String::new();
    res.try_reserve_exact(len)
        .map_err(|_| ReplyError::OutOfMemory)?;
    for label in name.iter() {
        if label.is_root() {
            break;
        }
        if !res.is_empty() {
            res.push('.');
        }
        push_label(&mut res, label);
    }
    Ok(res)
}

/// Appends a label to a string, escaping like the label's `Display` impl.
fn push_label(res: &mut String, label: Label) {
    for &ch in label.as_slice() {
        if ch == b'.' || ch == b'\\' {
            res.push('\\');
            res.push(char::from(ch));
        } else if (0x20..0x7F).contains(&ch) {
            res.push(char::from(ch));
        } else {
            res.push('\\');
            res.push(char::from(b'0' + ch / 100));
            res.push(char::from(b'0' + ch / 10 % 10));
            res.push(char::from(b'0' + ch % 10));
        }
    }
}

/// Makes room for one more element in a vec.
fn reserve_one<T>(vec: &mut Vec<T>) -> Result<(), ReplyError> {
    alloc_guard()?;
    if vec.len() == vec.capacity() {
        vec.try_reserve(1).map_err(|_| ReplyError::OutOfMemory)?;
    }
    Ok(())
}

/// Moves a value onto the heap.
///
/// Boxing itself cannot currently report allocation failure, so outside
/// of tests this only fails by aborting like any other infallible
/// allocation would.
fn try_box<T>(value: T) -> Result<Box<T>, ReplyError> {
    alloc_guard()?;
    Ok(Box::new(value))
}

//------------ alloc_fail ----------------------------------------------------

/// Test harness forcing the nth allocation of a decode to fail.
#[cfg(test)]
pub(crate) mod alloc_fail {
    use core::cell::Cell;

    thread_local! {
        static COUNTER: Cell<usize> = Cell::new(0);
        static FAIL_AT: Cell<Option<usize>> = Cell::new(None);
    }

    /// Starts counting allocations without failing any.
    pub fn count_only() {
        COUNTER.with(|c| c.set(0));
        FAIL_AT.with(|f| f.set(None));
    }

    /// Restarts counting, failing the `n`th allocation. One-based.
    pub fn fail_at(n: usize) {
        COUNTER.with(|c| c.set(0));
        FAIL_AT.with(|f| f.set(Some(n)));
    }

    /// Stops the harness and returns the number of allocations seen.
    pub fn finish() -> usize {
        FAIL_AT.with(|f| f.set(None));
        COUNTER.with(|c| c.get())
    }

    /// Counts an allocation and decides whether it should fail.
    pub(super) fn should_fail() -> bool {
        let n = COUNTER.with(|c| {
            let n = c.get() + 1;
            c.set(n);
            n
        });
        FAIL_AT.with(|f| f.get()) == Some(n)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    //--- Wire format builders

    fn name(labels: &[&[u8]]) -> Vec<u8> {
        let mut res = Vec::new();
        for label in labels {
            res.push(label.len() as u8);
            res.extend_from_slice(label);
        }
        res.push(0);
        res
    }

    fn charstr(s: &[u8]) -> Vec<u8> {
        let mut res = vec![s.len() as u8];
        res.extend_from_slice(s);
        res
    }

    fn naptr_rdata(
        order: u16,
        preference: u16,
        flags: &[u8],
        service: &[u8],
        regexp: &[u8],
        replacement: &[u8],
    ) -> Vec<u8> {
        let mut res = Vec::new();
        res.extend_from_slice(&order.to_be_bytes());
        res.extend_from_slice(&preference.to_be_bytes());
        res.extend_from_slice(&charstr(flags));
        res.extend_from_slice(&charstr(service));
        res.extend_from_slice(&charstr(regexp));
        res.extend_from_slice(replacement);
        res
    }

    fn record(owner: &[u8], rtype: u16, rdata: &[u8]) -> Vec<u8> {
        let mut res = Vec::new();
        res.extend_from_slice(owner);
        res.extend_from_slice(&rtype.to_be_bytes());
        res.extend_from_slice(&1u16.to_be_bytes());
        res.extend_from_slice(&300u32.to_be_bytes());
        res.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        res.extend_from_slice(rdata);
        res
    }

    /// Builds a response with the given question count, the claimed
    /// answer count, and the given answer records.
    fn message(qdcount: u16, ancount: u16, answers: &[Vec<u8>]) -> Vec<u8> {
        let mut res = Vec::new();
        res.extend_from_slice(&0x1234u16.to_be_bytes());
        res.extend_from_slice(&[0x84, 0x00]);
        res.extend_from_slice(&qdcount.to_be_bytes());
        res.extend_from_slice(&ancount.to_be_bytes());
        res.extend_from_slice(&[0; 4]);
        for _ in 0..qdcount {
            res.extend_from_slice(&name(&[b"example", b"com"]));
            res.extend_from_slice(&35u16.to_be_bytes());
            res.extend_from_slice(&1u16.to_be_bytes());
        }
        for answer in answers {
            res.extend_from_slice(answer);
        }
        res
    }

    fn two_record_reply() -> Vec<u8> {
        let owner = name(&[b"example", b"com"]);
        let first = record(
            &owner,
            35,
            &naptr_rdata(
                10,
                20,
                b"SP",
                b"service",
                b"regexp",
                &name(&[b"replace"]),
            ),
        );
        let second = record(
            &owner,
            35,
            &naptr_rdata(
                11,
                21,
                b"SP",
                b"service2",
                b"regexp2",
                &name(&[b"replace2"]),
            ),
        );
        message(1, 2, &[first, second])
    }

    //--- Successful decodes

    #[test]
    fn two_records() {
        let msg = two_record_reply();
        let reply = NaptrReply::parse(&msg).unwrap();
        assert_eq!(reply.len(), 2);

        let mut iter = reply.iter();
        let first = iter.next().unwrap();
        assert_eq!(first.order(), 10);
        assert_eq!(first.preference(), 20);
        assert_eq!(first.flags(), b"SP");
        assert_eq!(first.service(), b"service");
        assert_eq!(first.regexp(), b"regexp");
        assert_eq!(first.replacement(), "replace");

        let second = iter.next().unwrap();
        assert_eq!(second.order(), 11);
        assert_eq!(second.preference(), 21);
        assert_eq!(second.service(), b"service2");
        assert_eq!(second.regexp(), b"regexp2");
        assert_eq!(second.replacement(), "replace2");

        assert!(iter.next().is_none());
    }

    #[test]
    fn chain_traversal() {
        let msg = two_record_reply();
        let reply = NaptrReply::parse(&msg).unwrap();
        let first = reply.iter().next().unwrap();
        let second = first.next().unwrap();
        assert_eq!(second.order(), 11);
        assert!(second.next().is_none());
    }

    #[test]
    fn compressed_names() {
        // Owner and replacement both point back at the question name.
        let rdata = {
            let mut res = Vec::new();
            res.extend_from_slice(&10u16.to_be_bytes());
            res.extend_from_slice(&20u16.to_be_bytes());
            res.extend_from_slice(&charstr(b"S"));
            res.extend_from_slice(&charstr(b"SIP+D2U"));
            res.extend_from_slice(&charstr(b""));
            res.extend_from_slice(b"\x04_sip\xc0\x0c");
            res
        };
        let answer = record(b"\xc0\x0c", 35, &rdata);
        let msg = message(1, 1, &[answer]);
        let reply = NaptrReply::parse(&msg).unwrap();
        let entry = reply.iter().next().unwrap();
        assert_eq!(entry.replacement(), "_sip.example.com");
    }

    #[test]
    fn other_types_are_skipped() {
        let owner = name(&[b"example", b"com"]);
        let mx = record(&owner, 15, b"\x00\x0a\x04mail\xc0\x0c");
        let naptr = record(
            &owner,
            35,
            &naptr_rdata(10, 20, b"S", b"x", b"", &name(&[b"r"])),
        );
        let msg = message(1, 2, &[mx, naptr]);
        let reply = NaptrReply::parse(&msg).unwrap();
        assert_eq!(reply.len(), 1);
        assert_eq!(reply.iter().next().unwrap().order(), 10);
    }

    #[test]
    fn only_other_types_is_empty_success() {
        let owner = name(&[b"example", b"com"]);
        let mx = record(&owner, 15, b"\x00\x0a\x04mail\xc0\x0c");
        let msg = message(1, 1, &[mx]);
        let reply = NaptrReply::parse(&msg).unwrap();
        assert!(reply.is_empty());
        assert_eq!(reply.len(), 0);
    }

    //--- Structural errors

    #[test]
    fn question_count_must_be_one() {
        let answer = record(
            &name(&[b"example", b"com"]),
            35,
            &naptr_rdata(10, 20, b"S", b"x", b"", &name(&[b"r"])),
        );
        assert_eq!(
            NaptrReply::parse(&message(0, 1, &[answer.clone()]))
                .map(|_| ()),
            Err(ReplyError::BadResponse)
        );
        assert_eq!(
            NaptrReply::parse(&message(2, 1, &[answer])).map(|_| ()),
            Err(ReplyError::BadResponse)
        );
    }

    #[test]
    fn no_answers_is_no_data() {
        assert_eq!(
            NaptrReply::parse(&message(1, 0, &[])).map(|_| ()),
            Err(ReplyError::NoData)
        );
    }

    #[test]
    fn missing_claimed_answer() {
        // ancount says one record but the section is empty.
        assert_eq!(
            NaptrReply::parse(&message(1, 1, &[])).map(|_| ()),
            Err(ReplyError::BadName)
        );
    }

    #[test]
    fn rdata_must_use_up_rdlen() {
        // A well-formed NAPTR rdata with one stray octet appended.
        let mut rdata =
            naptr_rdata(10, 20, b"S", b"x", b"", &name(&[b"r"]));
        rdata.push(0);
        let answer = record(&name(&[b"example", b"com"]), 35, &rdata);
        assert_eq!(
            NaptrReply::parse(&message(1, 1, &[answer])).map(|_| ()),
            Err(ReplyError::BadResponse)
        );
    }

    #[test]
    fn short_rdata() {
        // The single answer claims a one-octet rdata. Decoding the NAPTR
        // data immediately overruns it.
        let answer = record(&name(&[b"example", b"com"]), 35, b"\x00");
        assert_eq!(
            NaptrReply::parse(&message(1, 1, &[answer])).map(|_| ()),
            Err(ReplyError::BadResponse)
        );
    }

    #[test]
    fn bad_compression_pointer() {
        // Replacement name points forward into the message.
        let mut rdata = Vec::new();
        rdata.extend_from_slice(&10u16.to_be_bytes());
        rdata.extend_from_slice(&20u16.to_be_bytes());
        rdata.extend_from_slice(&charstr(b"S"));
        rdata.extend_from_slice(&charstr(b"x"));
        rdata.extend_from_slice(&charstr(b""));
        rdata.extend_from_slice(b"\xc0\xff");
        let answer = record(&name(&[b"example", b"com"]), 35, &rdata);
        assert_eq!(
            NaptrReply::parse(&message(1, 1, &[answer])).map(|_| ()),
            Err(ReplyError::BadName)
        );
    }

    #[test]
    fn negative_length() {
        assert_eq!(
            parse_naptr_reply(&two_record_reply(), -1).map(|_| ()),
            Err(ReplyError::BadResponse)
        );
        assert_eq!(
            parse_naptr_reply(b"", -1).map(|_| ()),
            Err(ReplyError::BadResponse)
        );
    }

    #[test]
    fn length_beyond_buffer() {
        let msg = two_record_reply();
        assert_eq!(
            parse_naptr_reply(&msg, msg.len() as isize + 1).map(|_| ()),
            Err(ReplyError::BadResponse)
        );
    }

    #[test]
    fn truncation_sweep() {
        let msg = two_record_reply();
        assert!(NaptrReply::parse(&msg).is_ok());
        for len in 0..msg.len() {
            match NaptrReply::parse(&msg[..len]) {
                Err(ReplyError::BadResponse) | Err(ReplyError::BadName) => {}
                res => {
                    panic!("truncated to {} octets: got {:?}", len, res)
                }
            }
        }
    }

    //--- Allocation failure

    #[test]
    fn allocation_failure() {
        let msg = two_record_reply();

        alloc_fail::count_only();
        assert!(NaptrReply::parse(&msg).is_ok());
        let total = alloc_fail::finish();
        assert!(total > 0);

        for n in 1..=total {
            alloc_fail::fail_at(n);
            let res = NaptrReply::parse(&msg);
            alloc_fail::finish();
            assert_eq!(res.map(|_| ()), Err(ReplyError::OutOfMemory));
        }
    }

    //--- Release path

    #[test]
    fn clear_is_idempotent() {
        let msg = two_record_reply();
        let mut reply = NaptrReply::parse(&msg).unwrap();
        reply.clear();
        assert!(reply.is_empty());
        reply.clear();
        assert!(reply.is_empty());
    }

    #[test]
    fn drop_long_chain() {
        // A reply with a few thousand records must drop without blowing
        // the stack through recursive box drops.
        let owner = name(&[b"example", b"com"]);
        let answer = record(
            &owner,
            35,
            &naptr_rdata(10, 20, b"S", b"x", b"", &name(&[b"r"])),
        );
        let answers = vec![answer; 5000];
        let msg = message(1, 5000, &answers);
        let reply = NaptrReply::parse(&msg).unwrap();
        assert_eq!(reply.len(), 5000);
        drop(reply);
    }
}
