use serde::{Deserialize, Serialize};

use super::Field;
use crate::Error;

/// Field layout for building a table from scratch, usually stored as JSON:
///
/// ```json
/// { "fields": [ { "hash": 2089322, "mask": 4294967295, "start": 0, "shift": 0, "type": 1 } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub fields: Vec<Field>,
}

impl Template {
    pub fn from_json(data: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(data)?)
    }

    /// Smallest stride that holds every field.
    pub fn entry_size(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.start as usize + f.width())
            .max()
            .unwrap_or(0)
    }
}
