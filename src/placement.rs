//! Object placement records read out of `objinfo`/`stageobjinfo` tables.

use cgmath::Vector3;

use crate::jmp::Table;

/// Game units to editor world units.
pub const WORLD_SCALE: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPlacement {
    pub name: String,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl ObjectPlacement {
    pub fn from_entry(table: &Table, entry: usize) -> Self {
        let vec3 = |x: &str, y: &str, z: &str| {
            Vector3::new(table.get_float(entry, x), table.get_float(entry, y), table.get_float(entry, z))
                * WORLD_SCALE
        };
        Self {
            name: table.get_string(entry, "name"),
            position: vec3("pos_x", "pos_y", "pos_z"),
            rotation: vec3("dir_x", "dir_y", "dir_z"),
        }
    }

    pub fn from_table(table: &Table) -> Vec<Self> {
        (0..table.entry_count())
            .map(|entry| Self::from_entry(table, entry))
            .collect()
    }
}
