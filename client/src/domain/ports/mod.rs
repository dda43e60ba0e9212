//! Domain ports for the transport, session slot, and navigation shell.

mod macros;
pub(crate) use macros::define_port_error;

mod http_transport;
mod login_boundary;
mod session_storage;

#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{HttpResponse, HttpTransport, TransportError};
#[cfg(test)]
pub use login_boundary::MockLoginBoundary;
pub use login_boundary::{FixtureLoginBoundary, LoginBoundary};
#[cfg(test)]
pub use session_storage::MockSessionStorage;
pub use session_storage::{InMemorySessionStorage, SessionStorage, SessionStorageError};
