//! Submitting side of the pipeline.
//!
//! [`form::UrlForm`] holds what the user typed and checks the URL locally;
//! [`orchestrator::Orchestrator`] owns the [`status::UiStatus`] machine and sends one request at a
//! time through a [`transport::SubmitTransport`].

pub mod form;
pub mod locale;
pub mod orchestrator;
pub mod status;
pub mod transport;

pub use form::{Field, UrlForm};
pub use locale::Locale;
pub use orchestrator::{Busy, Orchestrator, Snapshot};
pub use status::{Icon, Presentation, Tone, UiStatus};
pub use transport::{Delivery, HttpTransport, SubmitTransport};
