//! Per-entity operation surface of the `RecordStore`.
//!
//! Each module contributes `impl RecordStore` blocks for one family of
//! entities.  The shared rhythm: lock the state, mutate the in-memory table,
//! persist the **entire** table through the backend, return the stored
//! record.  List operations never error — absence is an empty vector — and
//! build their joined views by scanning the referenced tables at read time.

pub mod accounts;
pub mod clinical;
pub mod map;
pub mod medications;
pub mod messaging;
pub mod profiles;
pub mod session;
pub mod tasks;
