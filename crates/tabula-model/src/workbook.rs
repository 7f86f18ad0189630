use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, Mutex, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};
use uuid::Uuid;

use crate::cache::ValueCache;
use crate::events::{EventBus, WorkbookEvent};
use crate::sheet::{Sheet, SheetError};
use crate::style::{CellStyle, StyleError, StyleRef, StyleRegistry};

/// Identifier for a workbook instance.
///
/// Minted per workbook; style handles carry it so that belongs-to-this-
/// workbook checks work without reference identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkbookId(Uuid);

/// State shared between a workbook and its sheets: the style registry and
/// the value-interning cache.
#[derive(Debug)]
pub(crate) struct WorkbookShared {
    pub(crate) id: WorkbookId,
    pub(crate) styles: RwLock<StyleRegistry>,
    pub(crate) cache: Mutex<ValueCache>,
}

/// A workbook: an ordered collection of sheets plus the named style registry
/// and value-interning cache they share.
#[derive(Debug)]
pub struct Workbook {
    shared: Arc<WorkbookShared>,
    sheets: Vec<Sheet>,
    current_sheet: usize,
    uri: Option<String>,
    events: EventBus<WorkbookEvent>,
}

impl Workbook {
    /// Create a new empty workbook. The default cell style is registered
    /// under the empty-string name.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(WorkbookShared {
                id: WorkbookId(Uuid::new_v4()),
                styles: RwLock::new(StyleRegistry::new()),
                cache: Mutex::new(ValueCache::new()),
            }),
            sheets: Vec::new(),
            current_sheet: 0,
            uri: None,
            events: EventBus::new(),
        }
    }

    /// This workbook's id.
    pub fn id(&self) -> WorkbookId {
        self.shared.id
    }

    /// The URI this workbook was loaded from, if any. Readers record it;
    /// the model itself never touches the filesystem.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn set_uri(&mut self, uri: Option<String>) {
        self.uri = uri;
    }

    /// Create a sheet with the given name, appended after existing sheets.
    pub fn create_sheet(&mut self, name: impl Into<String>) -> &mut Sheet {
        let index = self.sheets.len();
        self.sheets
            .push(Sheet::new(Arc::clone(&self.shared), name));
        self.events.submit(WorkbookEvent::SheetAdded { index });
        &mut self.sheets[index]
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// The sheet at `index`.
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Mutable access to the sheet at `index`.
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// The sheets, in insertion order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Mutable access to the sheets.
    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    /// Find a sheet by name.
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Find a sheet by name, mutably.
    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Remove and return the sheet at `index`.
    pub fn remove_sheet(&mut self, index: usize) -> Option<Sheet> {
        if index >= self.sheets.len() {
            return None;
        }
        let sheet = self.sheets.remove(index);
        self.events.submit(WorkbookEvent::SheetRemoved { index });
        Some(sheet)
    }

    /// Index of the current sheet.
    pub fn current_sheet_index(&self) -> usize {
        self.current_sheet
    }

    /// Make the sheet at `index` current.
    pub fn set_current_sheet(&mut self, index: usize) -> Result<(), SheetError> {
        if index >= self.sheets.len() {
            return Err(SheetError::InvalidSheetIndex(index));
        }
        if index != self.current_sheet {
            let old = std::mem::replace(&mut self.current_sheet, index);
            self.events
                .submit(WorkbookEvent::ActiveSheetChanged { old, new: index });
        }
        Ok(())
    }

    /// The current sheet; `None` when the current index points past the end
    /// (e.g. after removing sheets).
    pub fn current_sheet(&self) -> Option<&Sheet> {
        self.sheets.get(self.current_sheet)
    }

    /// Mutable access to the current sheet.
    pub fn current_sheet_mut(&mut self) -> Option<&mut Sheet> {
        self.sheets.get_mut(self.current_sheet)
    }

    /// The default cell style, registered under the empty-string name.
    pub fn default_cell_style(&self) -> StyleRef {
        StyleRef {
            workbook: self.shared.id,
            id: 0,
        }
    }

    /// Look up a named style, registering a default-valued style for a
    /// previously unseen name.
    pub fn cell_style(&self, name: &str) -> StyleRef {
        let id = self.shared.styles.write().ensure(name);
        StyleRef {
            workbook: self.shared.id,
            id,
        }
    }

    /// Returns true if a style is registered under `name`.
    pub fn has_cell_style(&self, name: &str) -> bool {
        self.shared.styles.read().contains(name)
    }

    /// All registered style names, in registration order. The default
    /// style's empty-string name is included.
    pub fn cell_style_names(&self) -> Vec<String> {
        self.shared.styles.read().names()
    }

    /// Read access to a style's attributes.
    pub fn style(&self, style: StyleRef) -> Result<MappedRwLockReadGuard<'_, CellStyle>, StyleError> {
        self.check_ours(style)?;
        Ok(RwLockReadGuard::map(self.shared.styles.read(), |registry| {
            registry.get(style.id)
        }))
    }

    /// Write access to a style's attributes.
    ///
    /// Style attribute edits do not emit cell-style-changed notifications;
    /// those fire when a cell's style *reference* is swapped.
    pub fn style_mut(
        &self,
        style: StyleRef,
    ) -> Result<MappedRwLockWriteGuard<'_, CellStyle>, StyleError> {
        self.check_ours(style)?;
        Ok(RwLockWriteGuard::map(
            self.shared.styles.write(),
            |registry| registry.get_mut(style.id),
        ))
    }

    /// The name a style is registered under.
    pub fn style_name(&self, style: StyleRef) -> Result<String, StyleError> {
        self.check_ours(style)?;
        Ok(self.shared.styles.read().name_of(style.id).to_string())
    }

    /// Register (or overwrite) the style named `name` as a deep copy of
    /// every attribute of `source`.
    pub fn copy_cell_style(&self, name: &str, source: StyleRef) -> Result<StyleRef, StyleError> {
        let copied = self.style(source)?.clone();
        let mut styles = self.shared.styles.write();
        let id = styles.ensure(name);
        *styles.get_mut(id) = copied;
        Ok(StyleRef {
            workbook: self.shared.id,
            id,
        })
    }

    /// Intern a string through the workbook's value cache.
    pub fn intern(&self, s: &str) -> Arc<str> {
        self.shared.cache.lock().intern(s)
    }

    /// Subscribe to workbook-level change notifications.
    pub fn subscribe(&mut self) -> Receiver<WorkbookEvent> {
        self.events.subscribe()
    }

    fn check_ours(&self, style: StyleRef) -> Result<(), StyleError> {
        if style.workbook != self.shared.id {
            return Err(StyleError::ForeignWorkbook);
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
