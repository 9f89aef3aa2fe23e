//! Sample preprocessing ahead of the buffer pipeline
//!
//! - Channel mixing (interleaved multi-channel to mono)

pub mod channel_mixer;
