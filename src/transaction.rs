//! Ambient transaction scope.
//!
//! A [`TransactionScope`] is a single-slot holder for the transaction of the
//! current execution context. The accessor owns one scope; calls issued while
//! a transaction is installed join it implicitly and never close its shared
//! connection. Installing a second transaction while one is active is an
//! error, never silent nesting.
//!
//! The scope is an owned value rather than process-global thread storage, so
//! "one ambient transaction per execution context" is a property of how the
//! accessor is shared rather than of hidden state.

use crate::driver::DriverConnection;
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// An active transaction: a driver connection with `begin` already issued.
///
/// Shared between the scope and any call that joins the transaction.
pub struct TransactionContext {
    connection: RefCell<Box<dyn DriverConnection>>,
}

impl TransactionContext {
    /// Wrap a connection that has an open transaction.
    pub fn new(connection: Box<dyn DriverConnection>) -> Self {
        Self {
            connection: RefCell::new(connection),
        }
    }

    /// Run a closure against the shared connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut dyn DriverConnection) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.connection.borrow_mut();
        f(guard.as_mut())
    }
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext").finish_non_exhaustive()
    }
}

/// Single-slot holder for the ambient transaction.
#[derive(Debug, Default)]
pub struct TransactionScope {
    current: RefCell<Option<Rc<TransactionContext>>>,
}

impl TransactionScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a transaction as ambient, or clear the slot with `None`.
    ///
    /// Installing while a transaction is already active fails; the existing
    /// transaction is left in place.
    pub fn set_current(&self, transaction: Option<Rc<TransactionContext>>) -> Result<()> {
        let mut slot = self.current.borrow_mut();
        if transaction.is_some() && slot.is_some() {
            return Err(Error::execution("Active transaction exists already"));
        }
        *slot = transaction;
        Ok(())
    }

    /// The ambient transaction, if one is installed.
    pub fn current(&self) -> Option<Rc<TransactionContext>> {
        self.current.borrow().clone()
    }

    /// Clear the slot unconditionally.
    pub fn clear(&self) {
        *self.current.borrow_mut() = None;
    }
}
