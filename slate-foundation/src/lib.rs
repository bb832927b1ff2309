//! Foundational types shared by the whole Slate front-end: source positions,
//! diagnostics, and the source-provider contract.

pub mod errors;
pub mod ordered;
pub mod source;
pub mod span;
