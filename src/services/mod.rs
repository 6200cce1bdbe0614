//! Clients for the third-party providers the API calls into.

pub mod mailgun;
pub mod stripe;

pub use mailgun::{Email, MailError, Mailer, MailgunService};
pub use stripe::{PaymentError, PaymentGateway, StripeService};
