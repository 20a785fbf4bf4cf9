use cookie_factory::bytes::*;
use cookie_factory::combinator::*;
use cookie_factory::multi::*;
use cookie_factory::sequence::tuple;
use cookie_factory::*;

use super::{Field, Table, FIELD_DEF_SIZE, HEADER_SIZE};
use crate::Error;

use std::io;

impl Field {
    fn write<W: io::Write>(&self) -> impl SerializeFn<W> {
        tuple((
            be_u32(self.hash),
            be_u32(self.bitmask),
            be_u16(self.start),
            be_u8(self.shift),
            be_u8(self.ty.into()),
        ))
    }
}

impl Table {
    /// Serializes the table with the records directly after the field directory.
    pub fn write<'a, W: io::Write + 'a>(&'a self) -> impl SerializeFn<W> + 'a {
        let entry_start = HEADER_SIZE + FIELD_DEF_SIZE * self.fields.len();
        tuple((
            be_i32(self.entry_count as i32),
            be_i32(self.fields.len() as i32),
            be_u32(entry_start as u32),
            be_u32(self.entry_size as u32),
            all(self.fields.iter().map(Field::write::<W>)),
            slice(&self.data),
        ))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(gen_simple(self.write(), Vec::new())?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jmp::test::table_bytes;
    use crate::jmp::{FieldType, NameHash};

    #[test]
    fn matches_hand_built_layout() {
        let fields = [
            Field {
                hash: NameHash::Jmp.hash("pos_x"),
                bitmask: 0xFFFF_FFFF,
                start: 0,
                shift: 0,
                ty: FieldType::Float,
            },
            Field {
                hash: NameHash::Jmp.hash("flags"),
                bitmask: 0x0000_0F00,
                start: 4,
                shift: 8,
                ty: FieldType::Integer,
            },
        ];
        let data = [0x3F, 0x80, 0, 0, 0, 0, 0x0A, 0, 0x40, 0, 0, 0, 0, 0, 0x03, 0];
        let bytes = table_bytes(2, 8, &fields, &data);
        let mut table = Table::from_bytes(&bytes).unwrap();
        assert_eq!(table.to_bytes().unwrap(), bytes);

        table.set_unsigned_int(1, "flags", 5);
        let decoded = Table::from_bytes(&table.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.get_unsigned_int(1, "flags"), 5);
        assert_eq!(decoded.get_float(1, "pos_x"), 2.);
        assert_eq!(decoded, table);
    }

    #[test]
    fn records_move_after_directory() {
        let fields = [Field {
            hash: 7,
            bitmask: 0xFF,
            start: 0,
            shift: 0,
            ty: FieldType::Other(4),
        }];
        let mut bytes = table_bytes(1, 4, &fields, &[]);
        // pad between the directory and the records
        bytes[8..12].copy_from_slice(&32u32.to_be_bytes());
        bytes.resize(32, 0xEE);
        bytes.extend_from_slice(&[0, 0, 0, 9]);
        let table = Table::from_bytes(&bytes).unwrap();
        assert_eq!(table.get_unsigned_int(0, 7u32), 9);
        let out = table.to_bytes().unwrap();
        assert_eq!(out.len(), HEADER_SIZE + FIELD_DEF_SIZE + 4);
        assert_eq!(Table::from_bytes(&out).unwrap(), table);
    }
}
