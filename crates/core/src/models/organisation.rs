//! Organisational units: outstations group cells, cells group members

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutStation {
    pub id: Uuid,
    pub name: String,
}

impl OutStation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: Uuid,
    pub name: String,
    pub outstation_id: Option<Uuid>,
}

impl Cell {
    pub fn new(name: impl Into<String>, outstation_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            outstation_id,
        }
    }
}

/// Calendar year used by reports; exactly one should be current
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurchYear {
    pub id: Uuid,
    pub year: i32,
    pub is_current: bool,
}

impl ChurchYear {
    pub fn new(year: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            year,
            is_current: false,
        }
    }
}
