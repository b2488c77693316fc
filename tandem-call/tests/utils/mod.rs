pub mod mock_devices;
pub mod session_helpers;

pub use mock_devices::*;
pub use session_helpers::*;
