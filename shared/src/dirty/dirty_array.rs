use super::{diff_mask::DiffMask, error::DiffMaskError, DirtyCollection};

/// Dirty state of one partial-capable array or list: a bit per element plus a
/// flag meaning the whole collection was replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyArray {
    fully_replaced: bool,
    elements: DiffMask,
}

impl DirtyArray {
    pub fn new(length: usize) -> Self {
        Self {
            fully_replaced: false,
            elements: DiffMask::new(length),
        }
    }

    /// Resizes to the tracked collection's current length. The existing
    /// bitmap is reused (cleared) when the length is unchanged.
    pub fn init(&mut self, length: usize) {
        if self.elements.bit_count() == length {
            self.elements.clear();
        } else {
            self.elements = DiffMask::new(length);
        }
    }

    pub fn len(&self) -> usize {
        self.elements.bit_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fully_replaced(&self) -> bool {
        self.fully_replaced
    }

    pub fn mark_full(&mut self) {
        self.fully_replaced = true;
    }

    /// # Panics
    ///
    /// Panics if `index` is past the tracked length.
    pub fn set_dirty(&mut self, index: usize) {
        self.elements.set_bit(index, true);
    }

    pub fn try_set_dirty(&mut self, index: usize) -> Result<(), DiffMaskError> {
        self.elements.try_set_bit(index, true)
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.elements.bit(index).unwrap_or(false)
    }

    pub fn elements(&self) -> &DiffMask {
        &self.elements
    }

    /// Replaces the element bits with ones received off the wire
    pub fn set_elements(&mut self, elements: DiffMask) {
        self.elements = elements;
    }

    pub fn is_clear(&self) -> bool {
        !self.fully_replaced && self.elements.is_clear()
    }

    /// Folds in the bits of `other`. Trackers of different lengths cannot
    /// line up their element bits, so the collection is then marked replaced.
    pub fn merge(&mut self, other: &DirtyArray) {
        if other.is_clear() {
            return;
        }
        if self.len() != other.len() {
            self.mark_full();
            return;
        }
        self.fully_replaced |= other.fully_replaced;
        self.elements.or(&other.elements);
    }

    fn clear(&mut self) {
        self.fully_replaced = false;
        self.elements.clear();
    }
}

impl DirtyCollection for DirtyArray {
    fn apply_changes(&mut self) {
        self.clear();
    }

    fn reject_changes(&mut self) {
        self.clear();
    }

    fn dirtiness_ratio(&self) -> f32 {
        if self.fully_replaced {
            return 1.0;
        }
        self.elements.ratio()
    }
}
