//! Macros for actions error handling.
//!
//! Provides convenience macros for creating and returning
//! [`crate::error::ActionsError`] instances with reduced boilerplate.

/// Creates an [`crate::error::ActionsError`] from error kind and description.
///
/// Accepts either a static description alone or a description with additional
/// dynamic detail.
#[macro_export]
macro_rules! actions_error {
    ($kind:expr, $desc:expr) => {
        ActionsError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        ActionsError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Creates and returns an [`crate::error::ActionsError`] from the current function.
///
/// Combines error creation with early return for error conditions that should
/// immediately terminate execution.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::actions_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::actions_error!($kind, $desc, $detail))
    };
}
