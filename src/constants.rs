/// Maximum cipher key length supported
pub const MAX_KEY_LEN: usize = 32;
/// Maximum cipher tag length supported
pub const MAX_TAG_LEN: usize = 16;
/// Maximum Noise message length
pub const MAX_MESSAGE_LEN: usize = 65535;
/// Pre-shared key length
pub const PSK_LEN: usize = 32;
/// Maximum number of tokens in a single handshake message
pub const MAX_TOKENS_PER_MESSAGE: usize = 8;
