//! Destinations for the notices raised by the engine.
//!
//! The engine only requires that a sink accepts notices in emission order. Collecting
//! into a `Vec` and forwarding over a crossbeam channel are provided here; console
//! rendering lives in the detector binary.
use crossbeam_channel::Sender;
use log::debug;
use mcast_common::Notice;

/// Receives notices in the order the engine emits them.
pub trait AlertSink {
    /// Handle a single notice.
    fn notify(&mut self, notice: Notice);
}

impl AlertSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// Forward notices to another thread. A hung-up receiver silently discards them.
impl AlertSink for Sender<Notice> {
    fn notify(&mut self, notice: Notice) {
        if self.send(notice).is_err() {
            debug!("Notice receiver is gone, dropping {:?}", notice.kind());
        }
    }
}

impl<S: AlertSink + ?Sized> AlertSink for &mut S {
    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice);
    }
}
