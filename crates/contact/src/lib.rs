//! Contact form pipeline: sanitize, validate, compose and hand the message to a
//! transactional email provider.

mod compose;
mod credential;
mod handler;
mod outcome;
pub mod provider;
mod rate_limit;
mod submission;
pub mod token;
mod validation;

pub use compose::*;
pub use credential::*;
pub use handler::*;
pub use outcome::*;
pub use provider::{EmailProvider, ProviderError};
pub use rate_limit::*;
pub use submission::*;
pub use validation::{ValidationError, is_valid_email, validate};
