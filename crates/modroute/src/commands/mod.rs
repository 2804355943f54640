pub mod edit;
pub mod extension;
pub mod resolve;
pub mod routes;

pub use edit::*;
pub use extension::*;
pub use resolve::*;
pub use routes::*;

use modroute_core::RouteError;
use starbase::AppResult;
use std::fmt::Display;

/// Print an error and exit with status 1
pub(crate) fn fail(message: impl Display) -> AppResult {
    eprintln!("Error: {}", message);
    Ok(Some(1))
}

/// Report a failed route build
///
/// `disabled` lists the extensions the failure switched off, if any.
pub(crate) fn fail_build(err: &RouteError, disabled: &[String]) -> AppResult {
    eprintln!("Error: {}", err);
    if !disabled.is_empty() {
        eprintln!(
            "Disabled extensions: {}. Fix the extension and enable them again.",
            disabled.join(", ")
        );
    }
    Ok(Some(1))
}
