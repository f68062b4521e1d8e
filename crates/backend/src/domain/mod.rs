pub mod a001_source;
pub mod a002_contributor;
