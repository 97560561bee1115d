use std::sync::{Mutex, MutexGuard, PoisonError};

/// A value that application threads may update between frames while the
/// render thread encodes or decodes it
pub struct SharedValue<T> {
    value: Mutex<T>,
}

impl<T> SharedValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    // A panic elsewhere while holding the lock leaves a complete value behind
    fn lock(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> SharedValue<T> {
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T: Default> Default for SharedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// A growable list shared the same way as [`SharedValue`]
pub struct SharedVec<T> {
    values: Mutex<Vec<T>>,
}

impl<T> SharedVec<T> {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, value: T) {
        self.lock().push(value);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn set_vec(&self, values: Vec<T>) {
        *self.lock() = values;
    }

    pub fn with<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> SharedVec<T> {
    pub fn get_vec(&self) -> Vec<T> {
        self.lock().clone()
    }
}

impl<T> Default for SharedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}
