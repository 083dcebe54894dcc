use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Maximum container nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

/// Decodes a single bencode value that must span the whole input.
///
/// Dictionary keys may appear in any order, which lets files written by
/// sloppy encoders be read; duplicate keys are always rejected.
///
/// # Examples
///
/// ```
/// use twt_gen::bencode::{decode, Value};
///
/// let value = decode(b"l4:spami42ee").unwrap();
/// assert_eq!(value.as_list().map(Vec::len), Some(2));
///
/// assert!(decode(b"i03e").is_err());
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    Decoder::new(data, false).decode_document()
}

/// Like [`decode`], but additionally requires dictionary keys to be in
/// ascending byte order, i.e. the input must be canonical.
pub fn decode_strict(data: &[u8]) -> Result<Value, BencodeError> {
    Decoder::new(data, true).decode_document()
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    strict: bool,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], strict: bool) -> Self {
        Self {
            data,
            pos: 0,
            strict,
        }
    }

    fn decode_document(mut self) -> Result<Value, BencodeError> {
        let value = self.decode_value(0)?;

        if self.pos != self.data.len() {
            return Err(BencodeError::TrailingData(self.pos));
        }

        Ok(value)
    }

    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof(self.pos))
    }

    fn decode_value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep(self.pos));
        }

        match self.peek()? {
            b'i' => self.decode_integer(),
            b'l' => self.decode_list(depth),
            b'd' => self.decode_dict(depth),
            b'0'..=b'9' => self.decode_bytes().map(Value::Bytes),
            c => Err(BencodeError::UnexpectedChar {
                offset: self.pos,
                ch: c as char,
            }),
        }
    }

    /// Returns the bytes between the current position and the next
    /// `terminator`, leaving the cursor just past the terminator.
    fn take_until(&mut self, terminator: u8) -> Result<&'a [u8], BencodeError> {
        let data: &'a [u8] = self.data;
        let start = self.pos;
        let rest = &data[start..];
        let len = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or(BencodeError::UnexpectedEof(self.data.len()))?;
        self.pos = start + len + 1;
        Ok(&rest[..len])
    }

    fn decode_integer(&mut self) -> Result<Value, BencodeError> {
        let offset = self.pos;
        self.pos += 1;
        let token = self.take_until(b'e')?;
        let invalid = |reason| BencodeError::InvalidInteger { offset, reason };

        let digits = token.strip_prefix(b"-").unwrap_or(token);
        if digits.is_empty() {
            return Err(invalid("empty"));
        }
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid("not a number"));
        }
        if digits[0] == b'0' && digits.len() > 1 {
            return Err(invalid("leading zeros"));
        }
        if digits == b"0" && token.len() > 1 {
            return Err(invalid("negative zero"));
        }

        // token is ASCII digits with an optional sign, so it is valid UTF-8
        let value = std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| invalid("out of range"))?;

        Ok(Value::Integer(value))
    }

    fn decode_bytes(&mut self) -> Result<Bytes, BencodeError> {
        let offset = self.pos;
        let prefix = self.take_until(b':')?;

        if prefix.is_empty()
            || !prefix.iter().all(u8::is_ascii_digit)
            || (prefix[0] == b'0' && prefix.len() > 1)
        {
            return Err(BencodeError::InvalidStringLength(offset));
        }

        let len: usize = std::str::from_utf8(prefix)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidStringLength(offset))?;

        if len > self.data.len() - self.pos {
            return Err(BencodeError::UnexpectedEof(self.data.len()));
        }

        let bytes = Bytes::copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(bytes)
    }

    fn decode_list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut list = Vec::new();

        while self.peek()? != b'e' {
            list.push(self.decode_value(depth + 1)?);
        }

        self.pos += 1;
        Ok(Value::List(list))
    }

    fn decode_dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut dict: BTreeMap<Bytes, Value> = BTreeMap::new();

        loop {
            let key_offset = self.pos;
            match self.peek()? {
                b'e' => break,
                b'0'..=b'9' => {}
                _ => return Err(BencodeError::NonStringKey(key_offset)),
            }

            let key = self.decode_bytes()?;

            if self.strict {
                if let Some((last, _)) = dict.last_key_value() {
                    if key < *last {
                        return Err(BencodeError::UnsortedKey(key_offset));
                    }
                }
            }

            let value = self.decode_value(depth + 1)?;
            match dict.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(_) => return Err(BencodeError::DuplicateKey(key_offset)),
            }
        }

        self.pos += 1;
        Ok(Value::Dict(dict))
    }
}
