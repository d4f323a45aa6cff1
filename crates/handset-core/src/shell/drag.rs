//! Press-drag-release gesture over home grid slots.

/// Tracks one drag from the icon picked up to the slot under the pointer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragTracker {
    origin: Option<usize>,
    hover: Option<usize>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    /// Pick up the icon at `slot`, abandoning any gesture in progress.
    pub fn pointer_down(&mut self, slot: usize) {
        self.origin = Some(slot);
        self.hover = Some(slot);
    }

    /// The pointer is over `slot`, or left the grid (`None`), which
    /// abandons the gesture.
    pub fn pointer_move(&mut self, slot: Option<usize>) {
        if self.origin.is_none() {
            return;
        }
        match slot {
            Some(s) => self.hover = Some(s),
            None => {
                log::debug!("Drag left the grid");
                self.cancel();
            },
        }
    }

    /// Drop. Returns the `(from, to)` move to commit, if any.
    pub fn pointer_up(&mut self) -> Option<(usize, usize)> {
        let origin = self.origin.take();
        let hover = self.hover.take();
        match (origin, hover) {
            (Some(from), Some(to)) if from != to => Some((from, to)),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.origin = None;
        self.hover = None;
    }
}
