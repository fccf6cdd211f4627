/// Errors that can occur while classifying wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The byte has its top bit clear and carries payload, not framing.
    #[error("0x{0:02X} is a data byte, not a status byte")]
    NotAStatusByte(u8),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
