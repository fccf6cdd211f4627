/// Errors returned by ring handle claims and producer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A `Producer` for this ring is already live.
    #[error("ring producer already claimed")]
    ProducerClaimed,

    /// A `Consumer` for this ring is already live.
    #[error("ring consumer already claimed")]
    ConsumerClaimed,

    /// The ring was full; the byte was rejected and counted as an overflow.
    #[error("ring full (byte 0x{0:02X} dropped)")]
    Full(u8),
}

pub type Result<T> = std::result::Result<T, RingError>;
