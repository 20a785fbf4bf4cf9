//! JMP/BCSV tables: fixed-stride arrays of bit-packed records addressed through a
//! directory of hashed field names.
//!
//! Field lookup compares hashes only. Tables in the wild pick names that do not collide
//! under their hash, so there is no fallback for collisions.

use log::*;
use nom::multi::count;
use nom::number::complete::*;
use nom::sequence::tuple;
use nom::IResult;
use serde::{Deserialize, Serialize};

use crate::Error;

mod names;
mod template;
mod write;

pub use names::known_field_name;
pub use template::Template;

pub const HEADER_SIZE: usize = 16;
pub const FIELD_DEF_SIZE: usize = 12;
pub const STRING_SIZE: usize = 32;
pub const HASH_PRIME: u32 = 33_554_393;

/// Field name hash used by a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameHash {
    /// `((hash << 8) + byte) % HASH_PRIME`
    Jmp,
    /// `hash * 31 + byte`
    Bcsv,
}

impl Default for NameHash {
    fn default() -> Self {
        NameHash::Jmp
    }
}

impl NameHash {
    /// Bytes are sign-extended before they are added, like `char` in the tools that
    /// authored these tables.
    pub fn hash(self, name: &str) -> u32 {
        name.bytes().fold(0u32, |hash, b| {
            let c = b as i8 as u32;
            match self {
                NameHash::Jmp => hash.wrapping_shl(8).wrapping_add(c) % HASH_PRIME,
                NameHash::Bcsv => hash.wrapping_mul(31).wrapping_add(c),
            }
        })
    }
}

/// Anything that identifies a field: its name, or the raw hash.
pub trait FieldName {
    fn field_hash(&self, scheme: NameHash) -> u32;
}

impl FieldName for &str {
    fn field_hash(&self, scheme: NameHash) -> u32 {
        scheme.hash(self)
    }
}

impl FieldName for String {
    fn field_hash(&self, scheme: NameHash) -> u32 {
        scheme.hash(self)
    }
}

impl FieldName for &String {
    fn field_hash(&self, scheme: NameHash) -> u32 {
        scheme.hash(self)
    }
}

impl FieldName for u32 {
    fn field_hash(&self, _: NameHash) -> u32 {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FieldType {
    Integer,
    String,
    Float,
    Other(u8),
}

impl From<u8> for FieldType {
    fn from(n: u8) -> Self {
        match n {
            0 => FieldType::Integer,
            1 => FieldType::String,
            2 => FieldType::Float,
            n => FieldType::Other(n),
        }
    }
}

impl From<FieldType> for u8 {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Integer => 0,
            FieldType::String => 1,
            FieldType::Float => 2,
            FieldType::Other(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub hash: u32,
    #[serde(rename = "mask")]
    pub bitmask: u32,
    /// Byte offset of the field's word inside an entry
    pub start: u16,
    pub shift: u8,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl Field {
    fn parse(i: &[u8]) -> IResult<&[u8], Self> {
        let (i, (hash, bitmask, start, shift, ty)) = tuple((be_u32, be_u32, be_u16, be_u8, be_u8))(i)?;
        let field = Field {
            hash,
            bitmask,
            start,
            shift,
            ty: ty.into(),
        };
        Ok((i, field))
    }

    /// Bytes this field occupies from `start`.
    pub fn width(&self) -> usize {
        match self.ty {
            FieldType::String => STRING_SIZE,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Header {
    entry_count: i32,
    field_count: i32,
    entry_start: u32,
    entry_size: u32,
}

impl Header {
    fn parse(i: &[u8]) -> IResult<&[u8], Self> {
        let (i, (entry_count, field_count, entry_start, entry_size)) =
            tuple((be_i32, be_i32, be_u32, be_u32))(i)?;
        let header = Header {
            entry_count,
            field_count,
            entry_start,
            entry_size,
        };
        Ok((i, header))
    }

    /// Ensures the records lie inside a buffer of `len` bytes.
    fn check(&self, len: usize) -> Result<(), Error> {
        if self.entry_size == 0 {
            return Err(Error::ZeroEntrySize);
        }
        for n in &[self.entry_count, self.field_count] {
            if *n < 0 {
                return Err(Error::NegativeCount(*n));
            }
        }
        let end = self.entry_start as u64 + self.entry_size as u64 * self.entry_count as u64;
        if end > len as u64 {
            return Err(Error::TableOutOfBounds { end, len });
        }
        Ok(())
    }
}

/// A decoded table. Owns a copy of its record bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    scheme: NameHash,
    entry_count: usize,
    entry_size: usize,
    fields: Vec<Field>,
    data: Vec<u8>,
}

impl Table {
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        Self::from_bytes_with(data, NameHash::Jmp)
    }

    pub fn from_bytes_with(data: &[u8], scheme: NameHash) -> Result<Self, Error> {
        let (i, header) = Header::parse(data)?;
        header.check(data.len())?;
        let (_, fields) = count(Field::parse, header.field_count as usize)(i)?;

        let start = header.entry_start as usize;
        let entry_size = header.entry_size as usize;
        let entry_count = header.entry_count as usize;
        debug!(
            "table: {} entr(ies) of {} byte(s) at {:#x}, {} field(s)",
            entry_count,
            entry_size,
            start,
            fields.len()
        );
        Ok(Table {
            scheme,
            entry_count,
            entry_size,
            fields,
            data: data[start..start + entry_size * entry_count].to_vec(),
        })
    }

    /// An empty (zeroed) table laid out after `template`.
    pub fn from_template(template: &Template, entry_count: usize) -> Result<Self, Error> {
        Self::from_template_with(template, entry_count, NameHash::Jmp)
    }

    pub fn from_template_with(template: &Template, entry_count: usize, scheme: NameHash) -> Result<Self, Error> {
        let entry_size = template.entry_size();
        if entry_size == 0 {
            return Err(Error::ZeroEntrySize);
        }
        Ok(Table {
            scheme,
            entry_count,
            entry_size,
            fields: template.fields.clone(),
            data: vec![0; entry_count * entry_size],
        })
    }

    pub fn scheme(&self) -> NameHash {
        self.scheme
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn entry_size(&self) -> usize {
        self.entry_size
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Raw record bytes, `entry_count * entry_size` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// First field whose hash matches.
    pub fn field(&self, name: impl FieldName) -> Option<&Field> {
        let hash = name.field_hash(self.scheme);
        self.fields.iter().find(|f| f.hash == hash)
    }

    /// Big-endian word at `offset` of the record bytes, or 0 past the end.
    pub fn peek_u32(&self, offset: usize) -> u32 {
        match self.data.get(offset..offset.saturating_add(4)) {
            Some(b) => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            None => 0,
        }
    }

    pub fn poke_u32(&mut self, offset: usize, value: u32) -> bool {
        match self.data.get_mut(offset..offset.saturating_add(4)) {
            Some(b) => {
                b.copy_from_slice(&value.to_be_bytes());
                true
            }
            None => false,
        }
    }

    fn locate(&self, entry: usize, name: impl FieldName) -> Option<(Field, usize)> {
        let field = *self.field(name)?;
        let offset = entry
            .checked_mul(self.entry_size)?
            .checked_add(field.start as usize)?;
        Some((field, offset))
    }

    /// Masked and shifted value of an integer field; 0 when the field is missing.
    pub fn get_unsigned_int(&self, entry: usize, name: impl FieldName) -> u32 {
        match self.locate(entry, name) {
            Some((field, offset)) => {
                (self.peek_u32(offset) & field.bitmask)
                    .checked_shr(field.shift as u32)
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// The whole word of a field, reinterpreted as signed.
    pub fn get_signed_int(&self, entry: usize, name: impl FieldName) -> i32 {
        match self.locate(entry, name) {
            Some((_, offset)) => self.peek_u32(offset) as i32,
            None => 0,
        }
    }

    pub fn get_float(&self, entry: usize, name: impl FieldName) -> f32 {
        match self.locate(entry, name) {
            Some((_, offset)) => f32::from_bits(self.peek_u32(offset)),
            None => 0.,
        }
    }

    pub fn get_boolean(&self, entry: usize, name: impl FieldName) -> bool {
        self.get_unsigned_int(entry, name) != 0
    }

    /// Bytes of a fixed 32-byte string slot up to the first nul, in whatever encoding the
    /// table was authored with; empty when the field is missing.
    pub fn get_string_bytes(&self, entry: usize, name: impl FieldName) -> &[u8] {
        let offset = match self.locate(entry, name) {
            Some((_, offset)) if offset < self.data.len() => offset,
            _ => return &[],
        };
        let end = (offset + STRING_SIZE).min(self.data.len());
        let slot = &self.data[offset..end];
        let len = slot.iter().position(|b| *b == 0).unwrap_or(slot.len());
        &slot[..len]
    }

    /// [`get_string_bytes`](Self::get_string_bytes) read as UTF-8. Names in other
    /// encodings (Shift-JIS in many retail tables) come back with replacement characters.
    pub fn get_string(&self, entry: usize, name: impl FieldName) -> String {
        String::from_utf8_lossy(self.get_string_bytes(entry, name)).into_owned()
    }

    /// Packs `value` into the field's bits, leaving the rest of the word untouched.
    pub fn set_unsigned_int(&mut self, entry: usize, name: impl FieldName, value: u32) -> bool {
        let (field, offset) = match self.locate(entry, name) {
            Some(found) => found,
            None => return false,
        };
        let current = self.peek_u32(offset);
        let packed = value.checked_shl(field.shift as u32).unwrap_or(0) & field.bitmask;
        self.poke_u32(offset, (current & !field.bitmask) | packed)
    }

    pub fn set_signed_int(&mut self, entry: usize, name: impl FieldName, value: i32) -> bool {
        match self.locate(entry, name) {
            Some((_, offset)) => self.poke_u32(offset, value as u32),
            None => false,
        }
    }

    pub fn set_float(&mut self, entry: usize, name: impl FieldName, value: f32) -> bool {
        match self.locate(entry, name) {
            Some((_, offset)) => self.poke_u32(offset, value.to_bits()),
            None => false,
        }
    }

    pub fn set_boolean(&mut self, entry: usize, name: impl FieldName, value: bool) -> bool {
        self.set_unsigned_int(entry, name, value as u32)
    }

    /// Stores at most 31 bytes of `value` and nul-pads the rest of the slot.
    pub fn set_string(&mut self, entry: usize, name: impl FieldName, value: &str) -> bool {
        let offset = match self.locate(entry, name) {
            Some((_, offset)) => offset,
            None => return false,
        };
        let slot = match self.data.get_mut(offset..offset.saturating_add(STRING_SIZE)) {
            Some(slot) => slot,
            None => return false,
        };
        let bytes = value.as_bytes();
        let len = bytes.len().min(STRING_SIZE - 1);
        if len < bytes.len() {
            warn!("truncating {:?} to {} bytes", value, len);
        }
        slot[..len].copy_from_slice(&bytes[..len]);
        for b in slot[len..].iter_mut() {
            *b = 0;
        }
        true
    }
}
