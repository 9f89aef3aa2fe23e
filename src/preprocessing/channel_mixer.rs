//! Channel mixing utilities (interleaved multi-channel to mono)

use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// Channel mixing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMixMode {
    /// Average of all channels
    #[default]
    Average,
    /// First channel only
    First,
    /// Per frame, the channel with the largest magnitude
    Dominant,
}

/// Downmix interleaved frames to mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out frame by frame (`L R L R ...` for stereo)
/// * `channels` - Channels per frame
/// * `mode` - Mixing mode
///
/// # Returns
///
/// One sample per frame
///
/// # Errors
///
/// Returns `InvalidInput` if `channels` is 0 or the sample count is not a
/// whole number of frames.
pub fn downmix(
    interleaved: &[f32],
    channels: usize,
    mode: ChannelMixMode,
) -> Result<Vec<f32>, GraphError> {
    if channels == 0 {
        return Err(GraphError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }
    if interleaved.len() % channels != 0 {
        return Err(GraphError::InvalidInput(format!(
            "{} samples is not a whole number of {}-channel frames",
            interleaved.len(),
            channels
        )));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| match mode {
            ChannelMixMode::Average => frame.iter().sum::<f32>() / channels as f32,
            ChannelMixMode::First => frame[0],
            ChannelMixMode::Dominant => frame
                .iter()
                .copied()
                .fold(0.0f32, |best, s| if s.abs() > best.abs() { s } else { best }),
        })
        .collect();

    Ok(mono)
}
