#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Label of the focused list entry; `None` when the entry has no label.
    LabelRead(Option<String>),
    /// The focused entry could not be read (stale reference, detached node).
    ReadFailed { reason: String },
    /// Engine finished handling an `Effect::Acquire`.
    AcquisitionFinished {
        identity: crate::ItemIdentity,
        outcome: crate::ItemOutcome,
    },
}
