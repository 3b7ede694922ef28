//! OSC 1.0 packet codec
//!
//! AbletonOSC speaks plain OSC 1.0 over UDP. One datagram carries either a
//! single message or a bundle of messages.
//!
//! ## Wire Format
//!
//! ```text
//! Message:
//!   address        OSC-string  "/live/track/get/volume\0\0"
//!   type tags      OSC-string  ",i\0\0"
//!   arguments      big-endian, each padded to 4 bytes
//!
//! Bundle:
//!   "#bundle\0"    8 bytes
//!   time tag       8 bytes (ignored on receive, "immediately" on send)
//!   elements       repeated: i32 size + message-or-bundle
//! ```
//!
//! An OSC-string is UTF-8 followed by 1-4 NUL bytes so the total length is a
//! multiple of four.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Bundle marker, including its NUL terminator
pub const BUNDLE_TAG: &[u8] = b"#bundle\0";

/// Time tag meaning "immediately"
pub const IMMEDIATE: u64 = 1;

/// Nested bundles deeper than this are rejected
const MAX_BUNDLE_DEPTH: usize = 8;

/// A single OSC argument
///
/// The peer mostly sends `Int`, `Float`, `String` and booleans; the wider
/// set is accepted so replies from other OSC stacks still decode.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Blob(Bytes),
    Bool(bool),
    Nil,
}

impl OscArg {
    /// Type tag character for this argument
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Long(_) => 'h',
            OscArg::Float(_) => 'f',
            OscArg::Double(_) => 'd',
            OscArg::String(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Bool(true) => 'T',
            OscArg::Bool(false) => 'F',
            OscArg::Nil => 'N',
        }
    }

    /// Integer value; booleans read as 0/1, longs only if they fit.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            OscArg::Int(v) => Some(*v),
            OscArg::Long(v) => i32::try_from(*v).ok(),
            OscArg::Bool(b) => Some(i32::from(*b)),
            _ => None,
        }
    }

    /// Float value; integers widen.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            OscArg::Float(v) => Some(*v),
            OscArg::Double(v) => Some(*v as f32),
            OscArg::Int(v) => Some(*v as f32),
            OscArg::Long(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OscArg::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value; Live reports most flags as integers, so any non-zero
    /// integer is true.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OscArg::Bool(b) => Some(*b),
            OscArg::Int(v) => Some(*v != 0),
            OscArg::Long(v) => Some(*v != 0),
            _ => None,
        }
    }
}

impl fmt::Display for OscArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArg::Int(v) => write!(f, "{}", v),
            OscArg::Long(v) => write!(f, "{}", v),
            OscArg::Float(v) => write!(f, "{}", v),
            OscArg::Double(v) => write!(f, "{}", v),
            OscArg::String(s) => write!(f, "{}", s),
            OscArg::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
            OscArg::Bool(b) => write!(f, "{}", b),
            OscArg::Nil => write!(f, "nil"),
        }
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        OscArg::Int(v)
    }
}

impl From<i64> for OscArg {
    fn from(v: i64) -> Self {
        OscArg::Long(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        OscArg::Float(v)
    }
}

impl From<f64> for OscArg {
    fn from(v: f64) -> Self {
        OscArg::Double(v)
    }
}

impl From<bool> for OscArg {
    fn from(v: bool) -> Self {
        OscArg::Bool(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        OscArg::String(v.to_string())
    }
}

impl From<String> for OscArg {
    fn from(v: String) -> Self {
        OscArg::String(v)
    }
}

/// Errors while encoding or decoding packets
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PacketError {
    #[error("Empty packet")]
    Empty,
    #[error("Packet truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Unterminated string at offset {0}")]
    Unterminated(usize),
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("Invalid type tag string: {0:?}")]
    InvalidTypeTags(String),
    #[error("Unknown type tag: {0:?}")]
    UnknownTypeTag(char),
    #[error("Invalid size {size} at offset {offset}")]
    InvalidSize { size: i32, offset: usize },
    #[error("Bundles nested deeper than {0}")]
    BundleTooDeep(usize),
    #[error("String argument contains NUL")]
    InteriorNul,
    #[error("Blob too large: {0} bytes")]
    BlobTooLarge(usize),
}

/// An OSC message: address plus ordered arguments
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Serialize to a single datagram
    pub fn encode(&self) -> Result<Bytes, PacketError> {
        let mut buf = BytesMut::with_capacity(padded_len(self.address.len() + 1) + 64);
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<(), PacketError> {
        validate_address(&self.address)?;
        put_osc_str(buf, &self.address);

        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        tags.extend(self.args.iter().map(OscArg::type_tag));
        put_osc_str(buf, &tags);

        for arg in &self.args {
            match arg {
                OscArg::Int(v) => buf.put_i32(*v),
                OscArg::Long(v) => buf.put_i64(*v),
                OscArg::Float(v) => buf.put_f32(*v),
                OscArg::Double(v) => buf.put_f64(*v),
                OscArg::String(s) => {
                    if s.contains('\0') {
                        return Err(PacketError::InteriorNul);
                    }
                    put_osc_str(buf, s);
                }
                OscArg::Blob(b) => {
                    let len = i32::try_from(b.len()).map_err(|_| PacketError::BlobTooLarge(b.len()))?;
                    buf.put_i32(len);
                    buf.put_slice(b);
                    pad(buf, b.len());
                }
                OscArg::Bool(_) | OscArg::Nil => {}
            }
        }

        Ok(())
    }

    /// Parse one message (not a bundle)
    pub fn decode(packet: &[u8]) -> Result<Self, PacketError> {
        let mut reader = Reader::new(packet);

        let address = reader.read_str("address")?;
        validate_address(address)?;

        // OSC 1.0 tolerates senders that omit the type tag string entirely
        if reader.is_empty() {
            return Ok(Self::new(address, Vec::new()));
        }

        let tags = reader.read_str("type tags")?;
        let tags = tags
            .strip_prefix(',')
            .ok_or_else(|| PacketError::InvalidTypeTags(tags.to_string()))?;

        let mut args = Vec::with_capacity(tags.len());
        for tag in tags.chars() {
            let arg = match tag {
                'i' => OscArg::Int(reader.read_i32()?),
                'h' => OscArg::Long(reader.read_i64()?),
                'f' => OscArg::Float(f32::from_bits(reader.read_u32()?)),
                'd' => OscArg::Double(f64::from_bits(reader.read_u64()?)),
                's' | 'S' => OscArg::String(reader.read_str("string argument")?.to_string()),
                'b' => {
                    let offset = reader.pos;
                    let size = reader.read_i32()?;
                    let len = usize::try_from(size)
                        .map_err(|_| PacketError::InvalidSize { size, offset })?;
                    OscArg::Blob(Bytes::copy_from_slice(reader.read_padded(len)?))
                }
                'T' => OscArg::Bool(true),
                'F' => OscArg::Bool(false),
                'N' | 'I' => OscArg::Nil,
                other => return Err(PacketError::UnknownTypeTag(other)),
            };
            args.push(arg);
        }

        Ok(Self::new(address, args))
    }
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for arg in &self.args {
            match arg {
                OscArg::String(s) => write!(f, " {:?}", s)?,
                other => write!(f, " {}", other)?,
            }
        }
        Ok(())
    }
}

/// Decode a datagram into the messages it carries.
///
/// Bundles are flattened depth-first in element order; their time tags are
/// ignored because replies are dispatched as soon as they arrive.
pub fn decode(datagram: &[u8]) -> Result<Vec<OscMessage>, PacketError> {
    let mut messages = Vec::new();
    decode_into(datagram, &mut messages, 0)?;
    Ok(messages)
}

fn decode_into(
    packet: &[u8],
    messages: &mut Vec<OscMessage>,
    depth: usize,
) -> Result<(), PacketError> {
    if packet.is_empty() {
        return Err(PacketError::Empty);
    }

    if !packet.starts_with(BUNDLE_TAG) {
        messages.push(OscMessage::decode(packet)?);
        return Ok(());
    }

    if depth >= MAX_BUNDLE_DEPTH {
        return Err(PacketError::BundleTooDeep(MAX_BUNDLE_DEPTH));
    }

    let mut reader = Reader::new(packet);
    reader.take(BUNDLE_TAG.len())?;
    let _time_tag = reader.read_u64()?;

    while !reader.is_empty() {
        let offset = reader.pos;
        let size = reader.read_i32()?;
        let len = usize::try_from(size)
            .ok()
            .filter(|len| len % 4 == 0)
            .ok_or(PacketError::InvalidSize { size, offset })?;
        let element = reader.take(len)?;
        decode_into(element, messages, depth + 1)?;
    }

    Ok(())
}

/// Serialize messages as one bundle with an "immediately" time tag.
pub fn encode_bundle(messages: &[OscMessage]) -> Result<Bytes, PacketError> {
    let mut buf = BytesMut::with_capacity(16 + messages.len() * 32);
    buf.put_slice(BUNDLE_TAG);
    buf.put_u64(IMMEDIATE);

    for message in messages {
        let element = message.encode()?;
        // Elements are already 4-byte aligned
        buf.put_i32(element.len() as i32);
        buf.put_slice(&element);
    }

    Ok(buf.freeze())
}

/// Addresses must be absolute and NUL-free
fn validate_address(address: &str) -> Result<(), PacketError> {
    if !address.starts_with('/') || address.contains('\0') {
        return Err(PacketError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

fn pad(buf: &mut BytesMut, written: usize) {
    for _ in written..padded_len(written) {
        buf.put_u8(0);
    }
}

fn put_osc_str(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
    pad(buf, s.len() + 1);
}

/// Bounds-checked cursor over a packet
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PacketError> {
        if self.remaining() < n {
            return Err(PacketError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, PacketError> {
        let mut b = self.take(4)?;
        Ok(b.get_u32())
    }

    fn read_i32(&mut self) -> Result<i32, PacketError> {
        let mut b = self.take(4)?;
        Ok(b.get_i32())
    }

    fn read_u64(&mut self) -> Result<u64, PacketError> {
        let mut b = self.take(8)?;
        Ok(b.get_u64())
    }

    fn read_i64(&mut self) -> Result<i64, PacketError> {
        let mut b = self.take(8)?;
        Ok(b.get_i64())
    }

    /// Read `len` bytes plus the padding that follows them
    fn read_padded(&mut self, len: usize) -> Result<&'a [u8], PacketError> {
        let chunk = self.take(padded_len(len))?;
        Ok(&chunk[..len])
    }

    fn read_str(&mut self, what: &'static str) -> Result<&'a str, PacketError> {
        let rest = &self.buf[self.pos.min(self.buf.len())..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(PacketError::Unterminated(self.pos))?;
        let s = std::str::from_utf8(&rest[..nul]).map_err(|_| PacketError::InvalidUtf8(what))?;
        self.take(padded_len(nul + 1))?;
        Ok(s)
    }
}
