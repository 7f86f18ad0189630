use std::sync::Arc;

use parking_lot::RwLock;

use crate::workbook::Workbook;

/// A workbook behind a cooperative read/write lock, for consumers that need
/// a consistent view across a sequence of calls (painting visible cells,
/// computing auto-size widths) while another thread edits.
///
/// The lock is advisory: the data structures do not enforce it, and
/// unsynchronized concurrent mutation is undefined behavior by design. Hold
/// the read lock around multi-call read sequences and the write lock around
/// mutations.
pub type SharedWorkbook = Arc<RwLock<Workbook>>;

/// Wrap a workbook for shared access.
pub fn share(workbook: Workbook) -> SharedWorkbook {
    Arc::new(RwLock::new(workbook))
}
