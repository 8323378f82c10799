//! Scoped ownership of broker handles.

use std::ops::{Deref, DerefMut};

use tracing::{trace, warn};

use crate::broker::Close;

/// Owns a broker handle and closes it when dropped.
///
/// Closing is total: a close fault is logged and swallowed, never
/// propagated and never able to stop the next release. Handles held in
/// locals are dropped in reverse declaration order, so nesting guards
/// releases consumer, then session, then connection.
pub struct Released<T: ?Sized + Close> {
    inner: Box<T>,
    label: &'static str,
}

impl<T: ?Sized + Close> Released<T> {
    pub fn new(inner: Box<T>, label: &'static str) -> Self {
        Self { inner, label }
    }
}

impl<T: ?Sized + Close> Deref for Released<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized + Close> DerefMut for Released<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: ?Sized + Close> Drop for Released<T> {
    fn drop(&mut self) {
        match self.inner.close() {
            Ok(()) => trace!(resource = self.label, "released"),
            Err(e) => warn!(resource = self.label, error = %e, "error closing"),
        }
    }
}
