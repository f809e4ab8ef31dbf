//! Explicit typed properties with change tracking.
//!
//! Components carry named fields wrapped in `Property<T>` instead of dynamic
//! property bags; each field knows whether it changed since the last tick.

#[derive(Debug, Clone, Default)]
pub struct Property<T> {
    value: T,
    changed: bool,
}

impl<T: PartialEq> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Sets the value, flagging a change only if it actually differs.
    pub fn set(&mut self, value: T) {
        if value != self.value {
            self.value = value;
            self.changed = true;
        }
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Reads and clears the changed flag. Called once per update tick.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

impl<T: Copy> Property<T> {
    pub fn value(&self) -> T {
        self.value
    }
}
