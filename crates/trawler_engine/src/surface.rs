//! Capabilities the engine needs from the UI automation layer.
//!
//! A single session object usually implements all three traits and is lent
//! to each component in turn; the engine never knows how the underlying
//! page is traversed.

use crate::SurfaceError;

/// The virtualized list: only the focused row is observable.
pub trait VirtualList {
    /// Whether the list has rendered at least one row.
    fn is_rendered(&mut self) -> Result<bool, SurfaceError>;
    /// One-off setup once the list has rendered, before the first read.
    fn prepare(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
    /// Label of the focused entry, `None` when it carries no label.
    fn current_label(&mut self) -> Result<Option<String>, SurfaceError>;
    /// Move focus to the next entry.
    fn advance(&mut self) -> Result<(), SurfaceError>;
}

/// Actions on the focused list entry.
pub trait ItemActions {
    fn reveal_focused(&mut self) -> Result<(), SurfaceError>;
    /// Whether the control that starts a transfer is present and clickable.
    fn acquire_control_ready(&mut self) -> Result<bool, SurfaceError>;
    fn invoke_acquire_control(&mut self) -> Result<(), SurfaceError>;
    /// Put focus back on the entry after the control stole it.
    fn refocus(&mut self) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    /// Position in the status view at listing time.
    pub index: usize,
    pub label: String,
}

/// The secondary transfer-status view.
pub trait TransferStatusView {
    fn open_status_view(&mut self) -> Result<(), SurfaceError>;
    fn close_status_view(&mut self) -> Result<(), SurfaceError>;
    fn transfer_entries(&mut self) -> Result<Vec<TransferEntry>, SurfaceError>;
    /// Open the entry's contextual menu and return the texts of its controls.
    fn entry_actions(&mut self, entry: &TransferEntry) -> Result<Vec<String>, SurfaceError>;
    fn invoke_entry_action(
        &mut self,
        entry: &TransferEntry,
        action: &str,
    ) -> Result<(), SurfaceError>;
}

/// Everything a full enumeration run needs from one session.
pub trait BrowserSession: VirtualList + ItemActions + TransferStatusView {}

impl<T: VirtualList + ItemActions + TransferStatusView> BrowserSession for T {}
