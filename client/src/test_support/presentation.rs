//! Recording doubles for the presentation ports.

use std::sync::{Mutex, MutexGuard};

use crate::domain::ports::{Navigator, Notifier};
use crate::domain::{CompanyId, UserNotice};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex"),
    }
}

/// Navigation requests in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    LeftCompany(CompanyId),
    ReturnedToList,
    SignIn,
}

#[derive(Debug, Default)]
pub struct RecordingNavigator(Mutex<Vec<NavigationEvent>>);

impl RecordingNavigator {
    pub fn events(&self) -> Vec<NavigationEvent> {
        lock(&self.0, "navigator").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn leave_company(&self, id: &CompanyId) {
        lock(&self.0, "navigator").push(NavigationEvent::LeftCompany(id.clone()));
    }

    fn return_to_list(&self) {
        lock(&self.0, "navigator").push(NavigationEvent::ReturnedToList);
    }

    fn to_sign_in(&self) {
        lock(&self.0, "navigator").push(NavigationEvent::SignIn);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<UserNotice>>);

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<UserNotice> {
        lock(&self.0, "notifier").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: UserNotice) {
        lock(&self.0, "notifier").push(notice);
    }
}
