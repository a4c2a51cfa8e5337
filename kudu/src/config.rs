//! Blockchain-wide constants shared by the timestamp codecs in [`crate::types::time`].

/// Epoch used by `block_timestamp`, in milliseconds since the Unix epoch.
///
/// This is 2000-01-01T00:00:00Z ("Y2K"), the reference point Antelope chains
/// use for their compact block-slot timestamp encoding.
pub const BLOCK_TIMESTAMP_EPOCH_MS: i64 = 946_684_800_000;

/// Duration of a block in milliseconds; `block_timestamp` counts slots of
/// this size since [`BLOCK_TIMESTAMP_EPOCH_MS`].
pub const BLOCK_INTERVAL_MS: i64 = 500;
