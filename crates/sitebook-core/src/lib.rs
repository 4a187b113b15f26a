//! Domain logic for sitebook: drywall phase scheduling, community reference
//! data, the EPO tracker, and site-note classification.
//!
//! Persistence lives in `sitebook-store`; this crate only calls its queries.

pub mod classify;
pub mod epo;
pub mod reference;
pub mod schedule;
