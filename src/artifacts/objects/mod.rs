//! Object model: blobs, trees and commits
//!
//! Every object is stored as `<type> <size>\0<payload>` and addressed by the
//! SHA-1 of that framed form. The framed bytes are what travels over the wire
//! and what lands on disk, so serialization must be deterministic.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a hex-encoded object id
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an object id in raw digest bytes
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
