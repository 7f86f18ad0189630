use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::address::RowCol;
use crate::style::StyleRef;
use crate::value::CellValue;

/// Change notifications emitted by a [`Sheet`](crate::Sheet).
///
/// Events carry owned payloads (coordinates and value clones), so consumers
/// never borrow into the model and can drain them at any point after the
/// mutation.
#[derive(Clone, Debug)]
pub enum SheetEvent {
    /// Rows `first..last` were materialized (`last` exclusive).
    RowsAdded { first: u32, last: u32 },
    /// The column count grew from `first` to `last`.
    ColumnsAdded { first: u32, last: u32 },
    /// A column width or row height changed.
    LayoutChanged,
    /// The current-cell cursor moved.
    ActiveCellChanged { old: RowCol, new: RowCol },
    /// The freeze position changed, as `(row, column)` pairs.
    SplitChanged { old: (u32, u32), new: (u32, u32) },
    /// The zoom factor changed.
    ZoomChanged { old: f32, new: f32 },
    /// A cell transitioned to a new value.
    CellValueChanged {
        cell: RowCol,
        old: CellValue,
        new: CellValue,
    },
    /// A cell now references a different style.
    CellStyleChanged {
        cell: RowCol,
        old: StyleRef,
        new: StyleRef,
    },
}

/// Change notifications emitted by a [`Workbook`](crate::Workbook).
#[derive(Clone, Debug)]
pub enum WorkbookEvent {
    /// A sheet was created at `index`.
    SheetAdded { index: usize },
    /// The sheet at `index` was removed.
    SheetRemoved { index: usize },
    /// The current-sheet index changed.
    ActiveSheetChanged { old: usize, new: usize },
}

/// Fan-out of events to subscriber channels.
///
/// Dispatch is synchronous sends; a subscriber whose receiver has been
/// dropped is pruned on the next submission.
#[derive(Debug)]
pub(crate) struct EventBus<E> {
    senders: Vec<Sender<E>>,
}

impl<E: Clone + fmt::Debug> EventBus<E> {
    pub(crate) fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self) -> Receiver<E> {
        let (sender, receiver) = channel();
        self.senders.push(sender);
        receiver
    }

    pub(crate) fn submit(&mut self, event: E) {
        if self.senders.is_empty() {
            return;
        }
        tracing::trace!(?event, "submitting event");
        self.senders.retain(|sender| sender.send(event.clone()).is_ok());
    }
}
