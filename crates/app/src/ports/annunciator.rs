//! Annunciator port — audible signals.

use std::sync::Arc;

use homewatch_domain::channel::Device;

/// Plays an audible alert for a device (e.g. the doorbell chime).
pub trait Annunciator: Send + Sync {
    fn chime(&self, device: Device);
}

impl<T: Annunciator> Annunciator for Arc<T> {
    fn chime(&self, device: Device) {
        (**self).chime(device);
    }
}

/// Annunciator that stays quiet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAnnunciator;

impl Annunciator for SilentAnnunciator {
    fn chime(&self, _device: Device) {}
}
