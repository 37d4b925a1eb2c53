#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Log why a label did not lead to an acquisition.
    Skip { label: String, reason: SkipReason },
    /// New qualifying identity: check local storage, trigger and monitor.
    Acquire { identity: crate::ItemIdentity },
    /// Move the list cursor to the next entry.
    Advance,
    /// The focused label stopped changing; enumeration is complete.
    Finish { unchanged_steps: u32 },
    /// Too many consecutive unreadable entries; the session is considered lost.
    Abort { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unparseable(crate::LabelError),
    ExtensionMismatch,
    Duplicate,
}
