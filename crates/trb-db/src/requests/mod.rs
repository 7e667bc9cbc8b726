//! Request types for engine mutations.
//!
//! Each request is a plain struct with a builder and a `validate()` that
//! checks what can be checked without the database. Requests serialize as
//! the trail `data` payload of the mutation they drive.

pub mod appearance;
pub mod vote;
pub mod voting;
