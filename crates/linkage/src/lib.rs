//! `storelink-linkage`: record-linkage engine for store datasets.
//!
//! Pure engine crate: receives pre-loaded tables, returns the boundary-filtered,
//! annotated registry plus a run summary. No CLI or file IO dependencies.

pub mod boundary;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod table;

pub use config::LinkConfig;
pub use engine::run;
pub use error::LinkError;
pub use model::{AnnotatedStoreRecord, AnnotatedTable, LinkInput, LinkResult, HEALTHY_FLAG_COLUMN};
pub use normalize::{normalize_header, normalize_text, to_zip5, Zip5};
pub use table::{RawRecord, RawTable};
