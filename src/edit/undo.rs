//! Notifications to the host's undo history.

use crate::host::ObjectHandle;

/// Host transaction log. The painter reports every object it creates or
/// destroys and brackets each stamp so the host can fold it into one step.
pub trait UndoLog {
    fn begin_group(&mut self, _label: &str) {}

    fn end_group(&mut self) {}

    fn record_created(&mut self, handle: ObjectHandle, label: &str);

    fn record_destroyed(&mut self, handle: ObjectHandle, label: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOp {
    Created(ObjectHandle),
    Destroyed(ObjectHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoGroup {
    pub label: String,
    pub ops: Vec<UndoOp>,
}

/// In-memory undo log that keeps closed groups in order
#[derive(Debug, Default)]
pub struct UndoRecorder {
    groups: Vec<UndoGroup>,
    open: Option<UndoGroup>,
}

impl UndoRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed, non-empty groups
    pub fn groups(&self) -> &[UndoGroup] {
        &self.groups
    }

    pub fn last(&self) -> Option<&UndoGroup> {
        self.groups.last()
    }

    pub fn created(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.groups.iter().flat_map(|g| &g.ops).filter_map(|op| match op {
            UndoOp::Created(h) => Some(*h),
            UndoOp::Destroyed(_) => None,
        })
    }

    pub fn destroyed(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.groups.iter().flat_map(|g| &g.ops).filter_map(|op| match op {
            UndoOp::Destroyed(h) => Some(*h),
            UndoOp::Created(_) => None,
        })
    }

    fn push(&mut self, op: UndoOp, label: &str) {
        match self.open.as_mut() {
            Some(group) => group.ops.push(op),
            None => self.groups.push(UndoGroup { label: label.to_string(), ops: vec![op] }),
        }
    }
}

impl UndoLog for UndoRecorder {
    fn begin_group(&mut self, label: &str) {
        self.end_group();
        self.open = Some(UndoGroup { label: label.to_string(), ops: Vec::new() });
    }

    fn end_group(&mut self) {
        if let Some(group) = self.open.take() {
            if !group.ops.is_empty() {
                self.groups.push(group);
            }
        }
    }

    fn record_created(&mut self, handle: ObjectHandle, label: &str) {
        self.push(UndoOp::Created(handle), label);
    }

    fn record_destroyed(&mut self, handle: ObjectHandle, label: &str) {
        self.push(UndoOp::Destroyed(handle), label);
    }
}
