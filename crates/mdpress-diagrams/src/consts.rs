//! Diagram rendering constants.

use std::time::Duration;

/// Default DPI requested from Kroki (2x for sharp rasterization).
pub const DEFAULT_DPI: u32 = 192;

/// CSS reference pixel density.
pub const STANDARD_DPI: u32 = 96;

/// Default HTTP timeout for Kroki requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Length of the content hash written to `data-diagram-hash`.
pub(crate) const HASH_LEN: usize = 12;
