//! Wire codecs for the record types.
//!
//! Each record converts among three independent representations:
//!
//! - **binary** — a compact positional stream ([`binary`]), every field in
//!   one fixed order, no field names, no defaulting;
//! - **row** — a tabular row with named columns ([`row`]), order
//!   insignificant, every column required;
//! - **document** — a JSON object ([`document`]), every key optional with
//!   field-by-field defaulting from the empty record.
//!
//! Codecs are free functions (`decode_binary`, `decode_row`,
//! `decode_document`, and the matching encoders) over plain value types; the
//! record types themselves carry no format knowledge.

pub mod attachment;
pub mod binary;
pub mod document;
pub mod row;
pub mod settings;
