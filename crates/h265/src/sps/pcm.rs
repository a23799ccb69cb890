use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::Result;

/// PCM sample settings.
///
/// Present in the SPS only when `pcm_enabled_flag == 1`.
///
/// ITU-T H.265 (2016-12) - 7.4.3.2.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm {
    /// The luma PCM sample bit depth minus 1.
    ///
    /// `PcmBitDepthY == pcm_sample_bit_depth_luma_minus1 + 1`
    pub pcm_sample_bit_depth_luma_minus1: u8,
    /// The chroma PCM sample bit depth minus 1.
    ///
    /// `PcmBitDepthC == pcm_sample_bit_depth_chroma_minus1 + 1`
    pub pcm_sample_bit_depth_chroma_minus1: u8,
    /// The log2 of the minimum PCM coding block size minus 3.
    pub log2_min_pcm_luma_coding_block_size_minus3: u64,
    /// The log2 difference between the maximum and minimum PCM coding block size.
    pub log2_diff_max_min_pcm_luma_coding_block_size: u64,
    /// Whether the loop filter is disabled for PCM coded blocks.
    pub pcm_loop_filter_disabled_flag: bool,
}

impl Pcm {
    pub(crate) fn parse(reader: &mut BitReader<'_>) -> Result<Self> {
        Ok(Pcm {
            pcm_sample_bit_depth_luma_minus1: reader.read_bits(4)? as u8,
            pcm_sample_bit_depth_chroma_minus1: reader.read_bits(4)? as u8,
            log2_min_pcm_luma_coding_block_size_minus3: reader.read_exp_golomb()?,
            log2_diff_max_min_pcm_luma_coding_block_size: reader.read_exp_golomb()?,
            pcm_loop_filter_disabled_flag: reader.read_bit()?,
        })
    }
}
