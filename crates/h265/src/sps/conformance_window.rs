use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::Result;

/// The cropping window applied to the decoded picture.
///
/// Present in the SPS only when `conformance_window_flag == 1`.
///
/// ITU-T H.265 (2016-12) - 7.4.3.2.1
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformanceWindow {
    /// Left crop offset, in units of `SubWidthC` luma samples.
    pub conf_win_left_offset: u64,
    /// Right crop offset, in units of `SubWidthC` luma samples.
    pub conf_win_right_offset: u64,
    /// Top crop offset, in units of `SubHeightC` luma samples.
    pub conf_win_top_offset: u64,
    /// Bottom crop offset, in units of `SubHeightC` luma samples.
    pub conf_win_bottom_offset: u64,
}

impl ConformanceWindow {
    pub(crate) fn parse(reader: &mut BitReader<'_>) -> Result<Self> {
        Ok(ConformanceWindow {
            conf_win_left_offset: reader.read_exp_golomb()?,
            conf_win_right_offset: reader.read_exp_golomb()?,
            conf_win_top_offset: reader.read_exp_golomb()?,
            conf_win_bottom_offset: reader.read_exp_golomb()?,
        })
    }
}
