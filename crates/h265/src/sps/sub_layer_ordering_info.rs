use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::Result;

/// Decoded picture buffer sizing and reordering limits, per sub-layer.
///
/// When `sps_sub_layer_ordering_info_present_flag == 1` each vector holds
/// one entry per sub-layer (`sps_max_sub_layers_minus1 + 1` entries).
/// Otherwise a single entry applies to all sub-layers.
///
/// ITU-T H.265 (2016-12) - 7.4.3.2.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLayerOrderingInfo {
    /// The maximum required size of the decoded picture buffer minus 1, per sub-layer.
    pub sps_max_dec_pic_buffering_minus1: Vec<u64>,
    /// The maximum allowed number of pictures preceding any picture in decoding
    /// order and following it in output order, per sub-layer.
    pub sps_max_num_reorder_pics: Vec<u64>,
    /// Used to compute `SpsMaxLatencyPictures`, per sub-layer.
    pub sps_max_latency_increase_plus1: Vec<u64>,
}

impl SubLayerOrderingInfo {
    pub(crate) fn parse(
        reader: &mut BitReader<'_>,
        sub_layer_ordering_info_present_flag: bool,
        max_sub_layers_minus1: u8,
    ) -> Result<Self> {
        let start = if sub_layer_ordering_info_present_flag {
            0
        } else {
            max_sub_layers_minus1
        };

        let count = (max_sub_layers_minus1 - start) as usize + 1;
        let mut sps_max_dec_pic_buffering_minus1 = Vec::with_capacity(count);
        let mut sps_max_num_reorder_pics = Vec::with_capacity(count);
        let mut sps_max_latency_increase_plus1 = Vec::with_capacity(count);

        for _ in start..=max_sub_layers_minus1 {
            sps_max_dec_pic_buffering_minus1.push(reader.read_exp_golomb()?);
            sps_max_num_reorder_pics.push(reader.read_exp_golomb()?);
            sps_max_latency_increase_plus1.push(reader.read_exp_golomb()?);
        }

        Ok(SubLayerOrderingInfo {
            sps_max_dec_pic_buffering_minus1,
            sps_max_num_reorder_pics,
            sps_max_latency_increase_plus1,
        })
    }
}
