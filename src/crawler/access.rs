//! Access classification of page loads
//!
//! The site never answers "forbidden" with a status code. It redirects: to the
//! sign-in page when the credential is missing or stale, to the front page when
//! a signed-in user may not see a resource, and to a restriction notice for
//! limited accounts. [`AccessOutcome`] names each case.

use crate::crawler::fetcher::Page;
use crate::utils::error::AccessError;

const SIGNIN_PATH: &str = "/signin";
const RESTRICTED_PATH: &str = "/restricted";
const ROOT_PATH: &str = "/";

/// What a page load means for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Page was served; extraction may proceed
    Granted,

    /// Sign-in needed. `credential_rejected` is set when the site bounced a
    /// credential we sent, which is then presumed stale.
    LoginRequired { credential_rejected: bool },

    /// Signed in, but the account is limited
    AccountRestricted,

    /// Signed in, but not allowed to see this resource
    AccessDenied,

    /// Redirected to an unrecognized path
    Unknown { path: String },
}

impl AccessOutcome {
    /// Classify a fetch result
    ///
    /// `had_credential` tells whether a credential was available when the
    /// request was sent.
    pub fn classify(page: &Page, had_credential: bool) -> Self {
        if !page.redirected {
            return Self::Granted;
        }

        let path = page.final_path.as_str();
        if path.starts_with(SIGNIN_PATH) {
            Self::LoginRequired {
                credential_rejected: true,
            }
        } else if path == ROOT_PATH {
            if had_credential {
                Self::AccessDenied
            } else {
                Self::LoginRequired {
                    credential_rejected: false,
                }
            }
        } else if path.starts_with(RESTRICTED_PATH) {
            Self::AccountRestricted
        } else {
            Self::Unknown {
                path: path.to_string(),
            }
        }
    }

    /// Whether extraction may proceed
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Turn a non-granted outcome into the typed error
    ///
    /// # Errors
    ///
    /// Returns the matching `AccessError` for every outcome except `Granted`
    pub fn into_result(self) -> Result<(), AccessError> {
        match self {
            Self::Granted => Ok(()),
            Self::LoginRequired { .. } => Err(AccessError::LoginRequired),
            Self::AccountRestricted => Err(AccessError::AccountRestricted),
            Self::AccessDenied => Err(AccessError::AccessDenied),
            Self::Unknown { path } => Err(AccessError::UnknownError { path }),
        }
    }
}
