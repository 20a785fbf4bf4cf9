use lazy_static::lazy_static;
use std::collections::HashMap;

use super::NameHash;

/// Field names seen in placement and scenario tables.
const NAMES: &[&str] = &[
    "name",
    "l_id",
    "pos_x",
    "pos_y",
    "pos_z",
    "dir_x",
    "dir_y",
    "dir_z",
    "scale_x",
    "scale_y",
    "scale_z",
    "ZoneName",
    "ScenarioNo",
    "ScenarioName",
    "PowerStarId",
    "CameraSetId",
    "CastId",
    "ViewGroupId",
    "ShapeModelNo",
    "CommonPath_ID",
    "ClippingGroupId",
    "GroupId",
    "DemoGroupId",
    "MapParts_ID",
    "Obj_ID",
    "ChildObjId",
    "SW_APPEAR",
    "SW_DEAD",
    "SW_A",
    "SW_B",
    "SW_SLEEP",
    "MessageId",
    "Obj_arg0",
    "Obj_arg1",
    "Obj_arg2",
    "Obj_arg3",
    "Obj_arg4",
    "Obj_arg5",
    "Obj_arg6",
    "Obj_arg7",
    "create_name",
    "character_name",
    "path_name",
    "code_name",
    "appear_flag",
    "disappear_flag",
];

lazy_static! {
    static ref JMP_NAMES: HashMap<u32, &'static str> =
        NAMES.iter().map(|n| (NameHash::Jmp.hash(n), *n)).collect();
    static ref BCSV_NAMES: HashMap<u32, &'static str> =
        NAMES.iter().map(|n| (NameHash::Bcsv.hash(n), *n)).collect();
}

/// Reverse lookup of a hash among commonly used field names.
pub fn known_field_name(hash: u32, scheme: NameHash) -> Option<&'static str> {
    match scheme {
        NameHash::Jmp => JMP_NAMES.get(&hash).copied(),
        NameHash::Bcsv => BCSV_NAMES.get(&hash).copied(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reverse_lookup() {
        for scheme in &[NameHash::Jmp, NameHash::Bcsv] {
            let hash = scheme.hash("pos_y");
            assert_eq!(known_field_name(hash, *scheme), Some("pos_y"));
        }
        assert_eq!(known_field_name(NameHash::Jmp.hash("not_a_field"), NameHash::Jmp), None);
    }
}
