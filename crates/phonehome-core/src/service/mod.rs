//! Sending notifications: the transport seam, the dispatcher, and the
//! facade tying them to resolution.

pub mod communicator;
pub mod dispatch;
pub mod transport;

pub use communicator::{Communicator, phone_home};
pub use dispatch::{DispatchReport, Dispatcher, SendOptions};
pub use transport::{Endpoint, Envelope, MailTransport, SmtpTransport, open_session};
