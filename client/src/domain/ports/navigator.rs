//! Port through which the coordinator asks the presentation layer to move
//! between screens.

use crate::domain::CompanyId;

#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Leave the detail screen of a company that no longer exists.
    fn leave_company(&self, id: &CompanyId);

    /// Return to the companies list after a form was submitted.
    fn return_to_list(&self);

    /// Show the sign-in screen.
    fn to_sign_in(&self);
}

/// Navigator for headless use. Ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn leave_company(&self, _id: &CompanyId) {}

    fn return_to_list(&self) {}

    fn to_sign_in(&self) {}
}
