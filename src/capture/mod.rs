// Capture side: buffer recycling and the simulated camera.

pub mod dummy;
pub mod permissions;
pub mod pool;

pub use dummy::{DummySource, DummySourceConfig, FrameCallback};
pub use permissions::{missing_permissions, Permission, PermissionProvider, StaticPermissions};
pub use pool::BufferPool;
