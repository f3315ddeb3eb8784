use crate::error::{CompressionError, Result};
use crate::share::Request;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The messaging SDK as seen from this crate.
///
/// Delivery, signatures and the wire format all live behind this trait.
pub trait Transport {
    /// Registers the app id with the SDK; `false` if the SDK refused.
    fn register(&self, app_id: &str) -> bool;

    /// Hands a request to the SDK; `false` if it was not accepted.
    fn send(&self, request: &Request) -> bool;
}

/// SDK result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Ok,
    Common,
    UserCancel,
    SentFailed,
    AuthDenied,
    Unsupported,
    Banned,
    Unknown(i32),
}

impl ResponseCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResponseCode::Ok,
            -1 => ResponseCode::Common,
            -2 => ResponseCode::UserCancel,
            -3 => ResponseCode::SentFailed,
            -4 => ResponseCode::AuthDenied,
            -5 => ResponseCode::Unsupported,
            -6 => ResponseCode::Banned,
            other => ResponseCode::Unknown(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseCode::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub transaction: String,
    pub code: ResponseCode,
    /// Authorization code returned by a successful login
    pub auth_code: Option<String>,
    pub message: Option<String>,
}

impl Response {
    pub fn new(transaction: impl Into<String>, code: i32) -> Self {
        Self {
            transaction: transaction.into(),
            code: ResponseCode::from_code(code),
            auth_code: None,
            message: None,
        }
    }

    pub fn with_auth_code(mut self, auth_code: impl Into<String>) -> Self {
        self.auth_code = Some(auth_code.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

pub type Completion = Box<dyn FnOnce(Response) + Send + 'static>;

/// Sends requests and routes each response to the callback registered with it.
///
/// Callbacks are keyed by transaction id, so overlapping share, login and
/// payment calls never see each other's results.
pub struct Dispatcher<T: Transport> {
    app_id: String,
    transport: T,
    registered: AtomicBool,
    pending: Mutex<HashMap<String, Completion>>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(app_id: impl Into<String>, transport: T) -> Self {
        Self {
            app_id: app_id.into(),
            transport,
            registered: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// Registers with the transport on first use. A refused registration is
    /// retried on the next call.
    pub fn ensure_registered(&self) -> Result<()> {
        if self.is_registered() {
            return Ok(());
        }
        if !self.transport.register(&self.app_id) {
            return Err(CompressionError::NotRegistered(self.app_id.clone()));
        }
        self.registered.store(true, Ordering::Release);
        crate::verbose!("Registered app id {}", self.app_id);
        Ok(())
    }

    /// Sends `request` and returns its transaction id.
    ///
    /// `on_complete` runs once, when the matching response is delivered. If the
    /// transport refuses the request the callback is dropped unrun. Resending a
    /// request whose transaction is still pending fails with
    /// `DuplicateTransaction` and leaves the first callback in place.
    pub fn send<F>(&self, request: impl Into<Request>, on_complete: F) -> Result<String>
    where
        F: FnOnce(Response) + Send + 'static,
    {
        self.ensure_registered()?;

        let request = request.into();
        let transaction = request.transaction().to_string();

        // Insert before sending so a synchronous response still finds it
        match self.lock_pending().entry(transaction.clone()) {
            Entry::Occupied(_) => return Err(CompressionError::DuplicateTransaction(transaction)),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(on_complete));
            }
        }

        if !self.transport.send(&request) {
            self.lock_pending().remove(&transaction);
            return Err(CompressionError::SendRejected(transaction));
        }

        crate::verbose!("Sent request {}", transaction);
        Ok(transaction)
    }

    /// Routes an SDK response to its callback. Returns `false` for unknown or
    /// already completed transactions.
    pub fn deliver(&self, response: Response) -> bool {
        let completion = self.lock_pending().remove(&response.transaction);
        match completion {
            Some(completion) => {
                crate::verbose!(
                    "Response for {}: {:?}",
                    response.transaction,
                    response.code
                );
                completion(response);
                true
            }
            None => {
                crate::warn!(
                    "Dropping response for unknown transaction {}",
                    response.transaction
                );
                false
            }
        }
    }

    /// Forgets a pending request without running its callback.
    pub fn cancel(&self, transaction: &str) -> bool {
        self.lock_pending().remove(transaction).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, Completion>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
