use serde::{Deserialize, Serialize};

// ============================================================================
// Names Value Objects
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NameRecord {
    pub id: i64,
    pub name: String,
}

/// One page of a year's names, in id order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub year: i64,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub records: Vec<NameRecord>,
}
