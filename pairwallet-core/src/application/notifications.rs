//! Notification port for the view layer

use crate::shared::types::Notice;
use std::sync::Mutex;

/// Sink for blocking notices and the loading indicator
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
    fn set_loading(&self, loading: bool);
}

/// Holds the loading indicator on for as long as it lives
pub struct LoadingGuard<'a> {
    notifier: &'a dyn Notifier,
}

impl<'a> LoadingGuard<'a> {
    pub fn new(notifier: &'a dyn Notifier) -> Self {
        notifier.set_loading(true);
        Self { notifier }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.notifier.set_loading(false);
    }
}

/// Writes notices to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        log::info!("{}: {}", notice.title, notice.message);
    }

    fn set_loading(&self, loading: bool) {
        log::debug!("Loading: {}", loading);
    }
}

/// Keeps every notice and loading transition in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    loading: Mutex<Vec<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices().pop()
    }

    /// Loading transitions, oldest first
    pub fn loading_history(&self) -> Vec<bool> {
        self.loading.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_history().last().copied().unwrap_or(false)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice.clone());
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Ok(mut history) = self.loading.lock() {
            history.push(loading);
        }
    }
}
