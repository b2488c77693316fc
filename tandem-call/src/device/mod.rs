mod provider;
mod synthetic;

pub use provider::{DeviceProvider, DeviceSelection, LocalMedia, MediaToggles, NullDevices};
pub use synthetic::SyntheticDevices;
