//! Filesystem implementation of the fichas metadata and attachment
//! stores.
//!
//! Layout, rooted at a fixed base directory:
//!
//! ```text
//! {base}/{ficha}/metadata.json
//! {base}/{ficha}/photo.jpg
//! {base}/{ficha}/photo-1.jpg
//! ```
//!
//! One partition directory per sanitized identifier; the directory owns
//! exactly one metadata document plus the record's attachment blobs.

mod store;


pub use store::FsStore;
