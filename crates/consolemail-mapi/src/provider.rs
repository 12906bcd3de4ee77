//! The provider seam: one method per Simple MAPI entry point.
//!
//! [`crate::MapiLibrary`] implements it over the real DLL. Anything else that
//! speaks the same request/response contract (test doubles included) can
//! stand in for it.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::types::{Message, MessageId, Recipient};

/// Handle of a logged-on session. Zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(NonZeroUsize);

impl SessionHandle {
    /// Wraps a raw handle; `0` yields `None`.
    #[must_use]
    pub const fn new(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Returns the raw handle.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

/// Arguments of `MAPILogon`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogonRequest<'a> {
    /// Profile to log on with; `None` lets the provider choose or prompt.
    pub profile: Option<&'a str>,
    /// Profile password.
    pub password: Option<&'a str>,
    /// Logon options.
    pub flags: Flags,
}

/// Arguments of `MAPIAddress`.
#[derive(Debug, Clone, Copy)]
pub struct AddressRequest<'a> {
    /// Dialog caption.
    pub caption: &'a str,
    /// Number of editable recipient fields (0..=4).
    pub edit_fields: u32,
    /// Label for a single edit field.
    pub labels: &'a str,
    /// Recipients to pre-populate.
    pub initial: &'a [Recipient],
    /// Dialog options.
    pub flags: Flags,
}

/// A messaging provider.
///
/// Every call is a blocking round trip. Returned values are owned; any
/// provider memory behind them has already been released.
pub trait Provider {
    /// Starts a session.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn logon(&mut self, request: &LogonRequest<'_>) -> Result<SessionHandle>;

    /// Ends a session.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn logoff(&mut self, session: SessionHandle, flags: Flags) -> Result<()>;

    /// Resolves a name to exactly one recipient.
    ///
    /// # Errors
    ///
    /// Ambiguous and unknown names fail with distinct codes.
    fn resolve_name(
        &mut self,
        session: SessionHandle,
        name: &str,
        flags: Flags,
    ) -> Result<Recipient>;

    /// Lets the operator pick recipients from the address book.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn address(
        &mut self,
        session: SessionHandle,
        request: &AddressRequest<'_>,
    ) -> Result<Vec<Recipient>>;

    /// Shows the provider's detail view for one recipient.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn details(
        &mut self,
        session: SessionHandle,
        recipient: &Recipient,
        flags: Flags,
    ) -> Result<()>;

    /// Returns the first matching message id, or the one after `seed`.
    ///
    /// # Errors
    ///
    /// The end of the enumeration is reported as `NoMessages`.
    fn find_next(
        &mut self,
        session: SessionHandle,
        message_type: Option<&str>,
        seed: Option<&MessageId>,
        flags: Flags,
    ) -> Result<MessageId>;

    /// Reads one message.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn read_mail(
        &mut self,
        session: SessionHandle,
        id: &MessageId,
        flags: Flags,
    ) -> Result<Message>;

    /// Sends a message.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn send_mail(
        &mut self,
        session: SessionHandle,
        message: &Message,
        flags: Flags,
    ) -> Result<()>;

    /// Saves a message into the store, replacing `id` when given.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn save_mail(
        &mut self,
        session: SessionHandle,
        message: &Message,
        id: Option<&MessageId>,
        flags: Flags,
    ) -> Result<MessageId>;

    /// Hands files to the provider's own compose window.
    ///
    /// # Errors
    ///
    /// Providers without this entry point return [`Error::NotImplemented`].
    fn send_documents(&mut self, paths: &[PathBuf], names: &[String]) -> Result<()> {
        let _ = (paths, names);
        Err(Error::NotImplemented("MAPISendDocuments"))
    }

    /// Initialises the provider library outside of a session.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure code.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Undoes [`Provider::initialize`].
    fn uninitialize(&mut self) {}
}

/// Keeps the provider initialised while in scope.
///
/// A failed initialisation is logged and the guard does nothing on drop.
pub struct InitGuard<'a, P: Provider + ?Sized> {
    provider: &'a mut P,
    active: bool,
}

impl<'a, P: Provider + ?Sized> InitGuard<'a, P> {
    /// Initialises `provider` until the guard is dropped.
    pub fn new(provider: &'a mut P) -> Self {
        let active = match provider.initialize() {
            Ok(()) => true,
            Err(e) => {
                warn!(?e, "Provider initialisation failed");
                false
            }
        };
        Self { provider, active }
    }

    /// Returns true if initialisation succeeded.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl<P: Provider + ?Sized> Drop for InitGuard<'_, P> {
    fn drop(&mut self) {
        if self.active {
            self.provider.uninitialize();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MapiError;

    #[derive(Default)]
    struct Counting {
        fail_init: bool,
        inits: u32,
        uninits: u32,
    }

    impl Provider for Counting {
        fn logon(&mut self, _: &LogonRequest<'_>) -> Result<SessionHandle> {
            Err(MapiError::LoginFailure.into())
        }
        fn logoff(&mut self, _: SessionHandle, _: Flags) -> Result<()> {
            Ok(())
        }
        fn resolve_name(&mut self, _: SessionHandle, _: &str, _: Flags) -> Result<Recipient> {
            Err(MapiError::UnknownRecipient.into())
        }
        fn address(&mut self, _: SessionHandle, _: &AddressRequest<'_>) -> Result<Vec<Recipient>> {
            Ok(Vec::new())
        }
        fn details(&mut self, _: SessionHandle, _: &Recipient, _: Flags) -> Result<()> {
            Ok(())
        }
        fn find_next(
            &mut self,
            _: SessionHandle,
            _: Option<&str>,
            _: Option<&MessageId>,
            _: Flags,
        ) -> Result<MessageId> {
            Err(MapiError::NoMessages.into())
        }
        fn read_mail(&mut self, _: SessionHandle, _: &MessageId, _: Flags) -> Result<Message> {
            Err(MapiError::InvalidMessage.into())
        }
        fn send_mail(&mut self, _: SessionHandle, _: &Message, _: Flags) -> Result<()> {
            Ok(())
        }
        fn save_mail(
            &mut self,
            _: SessionHandle,
            _: &Message,
            _: Option<&MessageId>,
            _: Flags,
        ) -> Result<MessageId> {
            Ok(MessageId::new("1"))
        }
        fn initialize(&mut self) -> Result<()> {
            self.inits += 1;
            if self.fail_init {
                Err(MapiError::Failure.into())
            } else {
                Ok(())
            }
        }
        fn uninitialize(&mut self) {
            self.uninits += 1;
        }
    }

    #[test]
    fn test_session_handle_rejects_zero() {
        assert!(SessionHandle::new(0).is_none());
        assert_eq!(SessionHandle::new(42).unwrap().get(), 42);
    }

    #[test]
    fn test_init_guard_pairs_calls() {
        let mut provider = Counting::default();
        {
            let guard = InitGuard::new(&mut provider);
            assert!(guard.is_active());
        }
        assert_eq!((provider.inits, provider.uninits), (1, 1));
    }

    #[test]
    fn test_failed_init_is_not_undone() {
        let mut provider = Counting {
            fail_init: true,
            ..Counting::default()
        };
        {
            let guard = InitGuard::new(&mut provider);
            assert!(!guard.is_active());
        }
        assert_eq!((provider.inits, provider.uninits), (1, 0));
    }

    #[test]
    fn test_send_documents_defaults_to_not_implemented() {
        let mut provider = Counting::default();
        let err = provider.send_documents(&[], &[]).unwrap_err();
        assert!(matches!(err, Error::NotImplemented("MAPISendDocuments")));
    }
}
