//! Gallery domain logic that does not touch the database or object store.
//!
//! - `folders`    - folder key resolution and grouping
//! - `navigation` - address parsing and the folder-list/detail state machine
//! - `upload`     - batch validation, folder normalization, storage key planning

pub mod folders;
pub mod navigation;
pub mod upload;
