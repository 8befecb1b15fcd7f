// src/extractors/mod.rs
pub mod tables;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use tables::{
    ExtractionResult,
    RecordSet,
    TableExtractor,
    AGE_GROUP_RECORD_SET,
    CRIME_TYPE_RECORD_SETS,
};
