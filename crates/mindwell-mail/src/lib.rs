//! Email notifications for Mindwell.
//!
//! Provides:
//! - [`EmailTemplate`]: the enumerated set of notifications, each rendering a
//!   subject and a plain-text body
//! - [`Email`]: a rendered message addressed to one recipient
//! - [`Mailer`]: async delivery trait, with [`HttpMailer`], [`LogMailer`] and
//!   [`MemoryMailer`] implementations
//! - [`MailProvider`]: which backend a configuration selects

pub mod error;
pub mod mailer;
pub mod template;

pub use error::{Error, Result};
pub use mailer::{HttpMailer, LogMailer, MailProvider, Mailer, MemoryMailer};
pub use template::{Email, EmailTemplate};
