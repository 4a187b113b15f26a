pub mod epos;
pub mod notes;
