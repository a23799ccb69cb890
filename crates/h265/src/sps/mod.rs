use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::diag::diag_error;
use crate::range_check::range_check;
use crate::rbsp::{more_rbsp_data, rbsp_trailing_bits, unescape_rbsp};
use crate::{NUM_SHORT_TERM_REF_PIC_SETS_MAX, Result, SpsError, UnsupportedFeature};

mod conformance_window;
mod pcm;
mod profile_tier_level;
mod st_ref_pic_set;
mod sub_layer_ordering_info;
mod vui_parameters;

pub use conformance_window::ConformanceWindow;
pub use pcm::Pcm;
pub use profile_tier_level::ProfileTierLevel;
pub use st_ref_pic_set::StRefPicSet;
pub use sub_layer_ordering_info::SubLayerOrderingInfo;
pub use vui_parameters::{
    AspectRatioInfo, BitstreamRestriction, ChromaLocInfo, CommonInf, DefaultDisplayWindow, HrdParameters, SubLayerHrd,
    SubLayerHrdParameters, SubPicHrdParams, VideoSignalType, VuiParameters, VuiTimingInfo,
};

/// The Sequence Parameter Set.
///
/// ITU-T H.265 (2016-12) - 7.3.2.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sps {
    /// The id of the active video parameter set.
    pub sps_video_parameter_set_id: u8,
    /// The maximum number of temporal sub-layers minus 1, in `[0, 6]`.
    pub sps_max_sub_layers_minus1: u8,
    /// Whether inter prediction is additionally restricted within sub-layers.
    pub sps_temporal_id_nesting_flag: bool,
    /// The profile, tier and level of the coded video sequence.
    pub profile_tier_level: ProfileTierLevel,
    /// The id of this SPS, in `[0, 15]`.
    pub sps_seq_parameter_set_id: u64,
    /// The chroma sampling, in `[0, 3]`.
    ///
    /// 0 is monochrome, 1 is 4:2:0, 2 is 4:2:2 and 3 is 4:4:4.
    pub chroma_format_idc: u8,
    /// Whether the three colour planes of a 4:4:4 sequence are coded
    /// separately. Only present when `chroma_format_idc == 3`.
    pub separate_colour_plane_flag: Option<bool>,
    /// The width of each decoded picture in luma samples, before cropping.
    pub pic_width_in_luma_samples: u64,
    /// The height of each decoded picture in luma samples, before cropping.
    pub pic_height_in_luma_samples: u64,
    /// The output cropping window, present when `conformance_window_flag == 1`.
    pub conformance_window: Option<ConformanceWindow>,
    /// The luma bit depth minus 8, in `[0, 8]`.
    pub bit_depth_luma_minus8: u8,
    /// The chroma bit depth minus 8, in `[0, 8]`.
    pub bit_depth_chroma_minus8: u8,
    /// Determines the size of the picture order count window, in `[0, 12]`.
    pub log2_max_pic_order_cnt_lsb_minus4: u8,
    /// Decoded picture buffer limits per sub-layer.
    pub sub_layer_ordering_info: SubLayerOrderingInfo,
    /// The log2 of the minimum luma coding block size minus 3.
    pub log2_min_luma_coding_block_size_minus3: u64,
    /// The log2 difference between the maximum and minimum luma coding block size.
    pub log2_diff_max_min_luma_coding_block_size: u64,
    /// The log2 of the minimum luma transform block size minus 2.
    pub log2_min_luma_transform_block_size_minus2: u64,
    /// The log2 difference between the maximum and minimum luma transform block size.
    pub log2_diff_max_min_luma_transform_block_size: u64,
    /// The maximum transform hierarchy depth for inter coded blocks.
    pub max_transform_hierarchy_depth_inter: u64,
    /// The maximum transform hierarchy depth for intra coded blocks.
    pub max_transform_hierarchy_depth_intra: u64,
    /// Whether scaling lists are used for transform coefficients.
    pub scaling_list_enabled_flag: bool,
    /// Whether scaling list data is carried in this SPS. Only present when
    /// `scaling_list_enabled_flag == 1`, and always `Some(false)` in a
    /// successfully decoded SPS.
    pub sps_scaling_list_data_present_flag: Option<bool>,
    /// Whether asymmetric motion partitions may be used.
    pub amp_enabled_flag: bool,
    /// Whether the sample adaptive offset filter is applied.
    pub sample_adaptive_offset_enabled_flag: bool,
    /// PCM sample settings, present when `pcm_enabled_flag == 1`.
    pub pcm: Option<Pcm>,
    /// The short-term reference picture sets, at most 64 entries.
    pub st_ref_pic_sets: Vec<StRefPicSet>,
    /// Long-term reference picture candidates, present when
    /// `long_term_ref_pics_present_flag == 1`.
    pub long_term_ref_pics: Option<LongTermRefPics>,
    /// Whether temporal motion vector prediction may be used.
    pub sps_temporal_mvp_enabled_flag: bool,
    /// Whether the bilinear interpolation filter is applied to intra
    /// reference samples of 32x32 blocks.
    pub strong_intra_smoothing_enabled_flag: bool,
    /// Video usability information, present when
    /// `vui_parameters_present_flag == 1`.
    pub vui_parameters: Option<VuiParameters>,
    /// Whether any extension syntax follows the base SPS fields.
    pub sps_extension_present_flag: bool,
    /// Reserved extension bits. A nonzero value means unknown future
    /// extension data was skipped.
    pub sps_extension_4bits: u8,
}

/// Long-term reference picture candidates signaled in the SPS.
///
/// ITU-T H.265 (2016-12) - 7.4.3.2.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongTermRefPics {
    /// `lt_ref_pic_poc_lsb_sps[i]`, the picture order count LSBs of each
    /// candidate, coded with `log2_max_pic_order_cnt_lsb_minus4 + 4` bits.
    pub lt_ref_pic_poc_lsb_sps: Vec<u32>,
    /// `used_by_curr_pic_lt_sps_flag[i]` for each candidate.
    pub used_by_curr_pic_lt_sps_flag: Vec<bool>,
}

impl Sps {
    /// Decodes an SPS from the payload of a NAL unit.
    ///
    /// `data` is everything after the 2-byte NAL unit header, with
    /// emulation prevention bytes still in place.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let rbsp = unescape_rbsp(data);
        let mut reader = BitReader::new(&rbsp);
        Self::parse_rbsp(&mut reader)
    }

    fn parse_rbsp(reader: &mut BitReader<'_>) -> Result<Self> {
        let sps_video_parameter_set_id = reader.read_bits(4)? as u8;

        let sps_max_sub_layers_minus1 = reader.read_bits(3)? as u8;
        range_check!(sps_max_sub_layers_minus1, 0, 6)?;

        let sps_temporal_id_nesting_flag = reader.read_bit()?;

        let profile_tier_level = ProfileTierLevel::parse(reader, sps_max_sub_layers_minus1)?;

        let sps_seq_parameter_set_id = reader.read_exp_golomb()?;
        range_check!(sps_seq_parameter_set_id, 0, 15)?;

        let chroma_format_idc = reader.read_exp_golomb()?;
        range_check!(chroma_format_idc, 0, 3)?;
        let chroma_format_idc = chroma_format_idc as u8;

        let mut separate_colour_plane_flag = None;
        if chroma_format_idc == 3 {
            separate_colour_plane_flag = Some(reader.read_bit()?);
        }

        let pic_width_in_luma_samples = reader.read_exp_golomb()?;
        let pic_height_in_luma_samples = reader.read_exp_golomb()?;

        let mut conformance_window = None;
        let conformance_window_flag = reader.read_bit()?;
        if conformance_window_flag {
            conformance_window = Some(ConformanceWindow::parse(reader)?);
        }

        let bit_depth_luma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_luma_minus8, 0, 8)?;
        let bit_depth_luma_minus8 = bit_depth_luma_minus8 as u8;

        let bit_depth_chroma_minus8 = reader.read_exp_golomb()?;
        range_check!(bit_depth_chroma_minus8, 0, 8)?;
        let bit_depth_chroma_minus8 = bit_depth_chroma_minus8 as u8;

        let log2_max_pic_order_cnt_lsb_minus4 = reader.read_exp_golomb()?;
        range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
        let log2_max_pic_order_cnt_lsb_minus4 = log2_max_pic_order_cnt_lsb_minus4 as u8;

        let sps_sub_layer_ordering_info_present_flag = reader.read_bit()?;
        let sub_layer_ordering_info = SubLayerOrderingInfo::parse(
            reader,
            sps_sub_layer_ordering_info_present_flag,
            sps_max_sub_layers_minus1,
        )?;

        let log2_min_luma_coding_block_size_minus3 = reader.read_exp_golomb()?;
        let log2_diff_max_min_luma_coding_block_size = reader.read_exp_golomb()?;
        let log2_min_luma_transform_block_size_minus2 = reader.read_exp_golomb()?;
        let log2_diff_max_min_luma_transform_block_size = reader.read_exp_golomb()?;
        let max_transform_hierarchy_depth_inter = reader.read_exp_golomb()?;
        let max_transform_hierarchy_depth_intra = reader.read_exp_golomb()?;

        let scaling_list_enabled_flag = reader.read_bit()?;
        let mut sps_scaling_list_data_present_flag = None;
        if scaling_list_enabled_flag {
            let data_present = reader.read_bit()?;
            if data_present {
                diag_error!("cannot decode SPS: scaling list data present");
                return Err(SpsError::UnsupportedFeature(UnsupportedFeature::ScalingListData));
            }
            sps_scaling_list_data_present_flag = Some(data_present);
        }

        let amp_enabled_flag = reader.read_bit()?;
        let sample_adaptive_offset_enabled_flag = reader.read_bit()?;

        let mut pcm = None;
        let pcm_enabled_flag = reader.read_bit()?;
        if pcm_enabled_flag {
            pcm = Some(Pcm::parse(reader)?);
        }

        let num_short_term_ref_pic_sets = reader.read_exp_golomb()?;
        if num_short_term_ref_pic_sets > NUM_SHORT_TERM_REF_PIC_SETS_MAX {
            diag_error!("cannot decode SPS: num_short_term_ref_pic_sets is {num_short_term_ref_pic_sets}");
            return Err(SpsError::LimitExceeded {
                num_short_term_ref_pic_sets,
            });
        }

        let mut st_ref_pic_sets = Vec::with_capacity(num_short_term_ref_pic_sets as usize);
        for i in 0..num_short_term_ref_pic_sets {
            let set = StRefPicSet::parse(reader, i, num_short_term_ref_pic_sets, &st_ref_pic_sets)?;
            st_ref_pic_sets.push(set);
        }

        let mut long_term_ref_pics = None;
        let long_term_ref_pics_present_flag = reader.read_bit()?;
        if long_term_ref_pics_present_flag {
            let num_long_term_ref_pics_sps = reader.read_exp_golomb()?;
            range_check!(num_long_term_ref_pics_sps, 0, 32)?;

            let mut lt_ref_pic_poc_lsb_sps = Vec::with_capacity(num_long_term_ref_pics_sps as usize);
            let mut used_by_curr_pic_lt_sps_flag = Vec::with_capacity(num_long_term_ref_pics_sps as usize);
            for _ in 0..num_long_term_ref_pics_sps {
                lt_ref_pic_poc_lsb_sps.push(reader.read_bits(log2_max_pic_order_cnt_lsb_minus4 as u32 + 4)? as u32);
                used_by_curr_pic_lt_sps_flag.push(reader.read_bit()?);
            }

            long_term_ref_pics = Some(LongTermRefPics {
                lt_ref_pic_poc_lsb_sps,
                used_by_curr_pic_lt_sps_flag,
            });
        }

        let sps_temporal_mvp_enabled_flag = reader.read_bit()?;
        let strong_intra_smoothing_enabled_flag = reader.read_bit()?;

        let mut vui_parameters = None;
        let vui_parameters_present_flag = reader.read_bit()?;
        if vui_parameters_present_flag {
            vui_parameters = Some(VuiParameters::parse(reader, sps_max_sub_layers_minus1)?);
        }

        let mut sps_extension_4bits = 0;
        let sps_extension_present_flag = reader.read_bit()?;
        if sps_extension_present_flag {
            let sps_range_extension_flag = reader.read_bit()?;
            let sps_multilayer_extension_flag = reader.read_bit()?;
            let sps_3d_extension_flag = reader.read_bit()?;
            let sps_scc_extension_flag = reader.read_bit()?;
            sps_extension_4bits = reader.read_bits(4)? as u8;

            if sps_range_extension_flag {
                diag_error!("cannot decode SPS: range extension present");
                return Err(SpsError::UnsupportedFeature(UnsupportedFeature::RangeExtension));
            }

            if sps_multilayer_extension_flag {
                diag_error!("cannot decode SPS: multilayer extension present");
                return Err(SpsError::UnsupportedFeature(UnsupportedFeature::MultilayerExtension));
            }

            if sps_3d_extension_flag {
                diag_error!("cannot decode SPS: 3D extension present");
                return Err(SpsError::UnsupportedFeature(UnsupportedFeature::Sps3dExtension));
            }

            if sps_scc_extension_flag {
                diag_error!("cannot decode SPS: screen content coding extension present");
                return Err(SpsError::UnsupportedFeature(UnsupportedFeature::SccExtension));
            }

            if sps_extension_4bits != 0 {
                // reserved for future extensions, skipped bit by bit
                while more_rbsp_data(reader) {
                    reader.read_bit()?;
                }
            }
        }

        rbsp_trailing_bits(reader)?;

        Ok(Sps {
            sps_video_parameter_set_id,
            sps_max_sub_layers_minus1,
            sps_temporal_id_nesting_flag,
            profile_tier_level,
            sps_seq_parameter_set_id,
            chroma_format_idc,
            separate_colour_plane_flag,
            pic_width_in_luma_samples,
            pic_height_in_luma_samples,
            conformance_window,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            log2_max_pic_order_cnt_lsb_minus4,
            sub_layer_ordering_info,
            log2_min_luma_coding_block_size_minus3,
            log2_diff_max_min_luma_coding_block_size,
            log2_min_luma_transform_block_size_minus2,
            log2_diff_max_min_luma_transform_block_size,
            max_transform_hierarchy_depth_inter,
            max_transform_hierarchy_depth_intra,
            scaling_list_enabled_flag,
            sps_scaling_list_data_present_flag,
            amp_enabled_flag,
            sample_adaptive_offset_enabled_flag,
            pcm,
            st_ref_pic_sets,
            long_term_ref_pics,
            sps_temporal_mvp_enabled_flag,
            strong_intra_smoothing_enabled_flag,
            vui_parameters,
            sps_extension_present_flag,
            sps_extension_4bits,
        })
    }

    /// `SubWidthC`, the horizontal chroma subsampling factor.
    ///
    /// ITU-T H.265 (2016-12) - Table 6.1
    pub const fn sub_width_c(&self) -> u8 {
        match self.chroma_format_idc {
            1 | 2 => 2,
            _ => 1,
        }
    }

    /// `SubHeightC`, the vertical chroma subsampling factor.
    ///
    /// ITU-T H.265 (2016-12) - Table 6.1
    pub const fn sub_height_c(&self) -> u8 {
        match self.chroma_format_idc {
            1 => 2,
            _ => 1,
        }
    }

    /// `ChromaArrayType`.
    ///
    /// Equal to `chroma_format_idc` unless the colour planes are coded
    /// separately, in which case each plane decodes as monochrome.
    ///
    /// ITU-T H.265 (2016-12) - 7.4.3.2.1
    pub fn chroma_array_type(&self) -> u8 {
        if self.separate_colour_plane_flag == Some(true) {
            0
        } else {
            self.chroma_format_idc
        }
    }

    /// The width of the pictures as they are output, in luma samples.
    ///
    /// This is `pic_width_in_luma_samples` with the conformance window
    /// cropping applied.
    pub fn width(&self) -> u64 {
        let (left, right) = self
            .conformance_window
            .as_ref()
            .map_or((0, 0), |w| (w.conf_win_left_offset, w.conf_win_right_offset));
        self.pic_width_in_luma_samples - self.sub_width_c() as u64 * (left + right)
    }

    /// The height of the pictures as they are output, in luma samples.
    ///
    /// This is `pic_height_in_luma_samples` with the conformance window
    /// cropping applied.
    pub fn height(&self) -> u64 {
        let (top, bottom) = self
            .conformance_window
            .as_ref()
            .map_or((0, 0), |w| (w.conf_win_top_offset, w.conf_win_bottom_offset));
        self.pic_height_in_luma_samples - self.sub_height_c() as u64 * (top + bottom)
    }

    /// `BitDepth_Y`, the luma bit depth.
    pub const fn bit_depth_y(&self) -> u8 {
        self.bit_depth_luma_minus8 + 8
    }

    /// `BitDepth_C`, the chroma bit depth.
    pub const fn bit_depth_c(&self) -> u8 {
        self.bit_depth_chroma_minus8 + 8
    }

    /// `MaxPicOrderCntLsb`.
    pub const fn max_pic_order_cnt_lsb(&self) -> u64 {
        1 << (self.log2_max_pic_order_cnt_lsb_minus4 + 4)
    }

    /// `MinCbLog2SizeY`, the log2 of the minimum luma coding block size.
    ///
    /// ITU-T H.265 (2016-12) - 7.4.3.2.1
    pub const fn min_cb_log2_size_y(&self) -> u64 {
        self.log2_min_luma_coding_block_size_minus3 + 3
    }

    /// `CtbLog2SizeY`, the log2 of the coding tree block size.
    ///
    /// ITU-T H.265 (2016-12) - 7.4.3.2.1
    pub const fn ctb_log2_size_y(&self) -> u64 {
        self.min_cb_log2_size_y() + self.log2_diff_max_min_luma_coding_block_size
    }

    /// `CtbSizeY`, the coding tree block size in luma samples.
    pub const fn ctb_size_y(&self) -> u64 {
        1 << self.ctb_log2_size_y()
    }

    /// `PicWidthInCtbsY`, the picture width in coding tree blocks.
    ///
    /// A partially covered rightmost column counts as a full block.
    pub fn pic_width_in_ctbs_y(&self) -> u64 {
        self.pic_width_in_luma_samples.div_ceil(self.ctb_size_y())
    }

    /// `PicHeightInCtbsY`, the picture height in coding tree blocks.
    ///
    /// A partially covered bottom row counts as a full block.
    pub fn pic_height_in_ctbs_y(&self) -> u64 {
        self.pic_height_in_luma_samples.div_ceil(self.ctb_size_y())
    }

    /// `PicSizeInCtbsY`, the number of coding tree blocks in one picture.
    pub fn pic_size_in_ctbs_y(&self) -> u64 {
        self.pic_width_in_ctbs_y() * self.pic_height_in_ctbs_y()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use strobe_bytes_util::BitWriter;
    use strobe_expgolomb::BitWriterExpGolombExt;

    use super::Sps;
    use crate::{SpsError, UnsupportedFeature};

    fn write_profile_tier_level(writer: &mut BitWriter, max_sub_layers_minus1: u8) {
        writer.write_bits(0, 2); // general_profile_space
        writer.write_bit(false); // general_tier_flag
        writer.write_bits(1, 5); // general_profile_idc (Main)
        writer.write_bits(0x6000_0000, 32); // compatibility flags 1 and 2
        writer.write_bit(true); // progressive
        writer.write_bit(false); // interlaced
        writer.write_bit(false); // non_packed
        writer.write_bit(true); // frame_only
        writer.write_bits(0, 43); // reserved
        writer.write_bit(false); // inbld
        writer.write_bits(120, 8); // general_level_idc (level 4.0)

        if max_sub_layers_minus1 > 0 {
            // no sub-layer profile or level data
            for _ in 0..max_sub_layers_minus1 {
                writer.write_bit(false);
                writer.write_bit(false);
            }
            for _ in max_sub_layers_minus1..8 {
                writer.write_bits(0, 2); // reserved_zero_2bits
            }
        }
    }

    /// Builds a syntactically complete SPS payload, one field at a time.
    struct SpsBuilder {
        sps_video_parameter_set_id: u64,
        max_sub_layers_minus1: u8,
        chroma_format_idc: u64,
        separate_colour_plane_flag: bool,
        pic_width_in_luma_samples: u64,
        pic_height_in_luma_samples: u64,
        conformance_window: Option<[u64; 4]>,
        log2_max_pic_order_cnt_lsb_minus4: u64,
        sub_layer_ordering_info_present_flag: bool,
        scaling_list_enabled_flag: bool,
        sps_scaling_list_data_present_flag: bool,
        pcm_enabled_flag: bool,
        num_short_term_ref_pic_sets: u64,
        long_term_ref_pics: Option<Vec<(u32, bool)>>,
        vui_parameters_present_flag: bool,
        // (range, multilayer, 3d, scc, extension_4bits)
        extension: Option<(bool, bool, bool, bool, u8)>,
    }

    impl Default for SpsBuilder {
        fn default() -> Self {
            Self {
                sps_video_parameter_set_id: 0,
                max_sub_layers_minus1: 0,
                chroma_format_idc: 1,
                separate_colour_plane_flag: false,
                pic_width_in_luma_samples: 1920,
                pic_height_in_luma_samples: 1080,
                conformance_window: None,
                log2_max_pic_order_cnt_lsb_minus4: 0,
                sub_layer_ordering_info_present_flag: false,
                scaling_list_enabled_flag: false,
                sps_scaling_list_data_present_flag: false,
                pcm_enabled_flag: false,
                num_short_term_ref_pic_sets: 0,
                long_term_ref_pics: None,
                vui_parameters_present_flag: false,
                extension: None,
            }
        }
    }

    impl SpsBuilder {
        fn build(&self) -> Vec<u8> {
            let mut w = BitWriter::new();

            w.write_bits(self.sps_video_parameter_set_id, 4);
            w.write_bits(self.max_sub_layers_minus1 as u64, 3);
            w.write_bit(true); // sps_temporal_id_nesting_flag
            write_profile_tier_level(&mut w, self.max_sub_layers_minus1);
            w.write_exp_golomb(0); // sps_seq_parameter_set_id
            w.write_exp_golomb(self.chroma_format_idc);
            if self.chroma_format_idc == 3 {
                w.write_bit(self.separate_colour_plane_flag);
            }
            w.write_exp_golomb(self.pic_width_in_luma_samples);
            w.write_exp_golomb(self.pic_height_in_luma_samples);
            match &self.conformance_window {
                Some(offsets) => {
                    w.write_bit(true);
                    for offset in offsets {
                        w.write_exp_golomb(*offset);
                    }
                }
                None => w.write_bit(false),
            }
            w.write_exp_golomb(0); // bit_depth_luma_minus8
            w.write_exp_golomb(0); // bit_depth_chroma_minus8
            w.write_exp_golomb(self.log2_max_pic_order_cnt_lsb_minus4);

            w.write_bit(self.sub_layer_ordering_info_present_flag);
            let ordering_entries = if self.sub_layer_ordering_info_present_flag {
                self.max_sub_layers_minus1 as u64 + 1
            } else {
                1
            };
            for i in 0..ordering_entries {
                w.write_exp_golomb(4 + i); // sps_max_dec_pic_buffering_minus1
                w.write_exp_golomb(2); // sps_max_num_reorder_pics
                w.write_exp_golomb(0); // sps_max_latency_increase_plus1
            }

            w.write_exp_golomb(0); // log2_min_luma_coding_block_size_minus3
            w.write_exp_golomb(2); // log2_diff_max_min_luma_coding_block_size
            w.write_exp_golomb(0); // log2_min_luma_transform_block_size_minus2
            w.write_exp_golomb(3); // log2_diff_max_min_luma_transform_block_size
            w.write_exp_golomb(0); // max_transform_hierarchy_depth_inter
            w.write_exp_golomb(0); // max_transform_hierarchy_depth_intra

            w.write_bit(self.scaling_list_enabled_flag);
            if self.scaling_list_enabled_flag {
                w.write_bit(self.sps_scaling_list_data_present_flag);
            }

            w.write_bit(true); // amp_enabled_flag
            w.write_bit(true); // sample_adaptive_offset_enabled_flag

            w.write_bit(self.pcm_enabled_flag);
            if self.pcm_enabled_flag {
                w.write_bits(7, 4); // pcm_sample_bit_depth_luma_minus1
                w.write_bits(7, 4); // pcm_sample_bit_depth_chroma_minus1
                w.write_exp_golomb(0); // log2_min_pcm_luma_coding_block_size_minus3
                w.write_exp_golomb(2); // log2_diff_max_min_pcm_luma_coding_block_size
                w.write_bit(true); // pcm_loop_filter_disabled_flag
            }

            w.write_exp_golomb(self.num_short_term_ref_pic_sets);
            for i in 0..self.num_short_term_ref_pic_sets {
                if i != 0 {
                    w.write_bit(false); // inter_ref_pic_set_prediction_flag
                }
                w.write_exp_golomb(1); // num_negative_pics
                w.write_exp_golomb(0); // num_positive_pics
                w.write_exp_golomb(0); // delta_poc_s0_minus1[0]
                w.write_bit(true); // used_by_curr_pic_s0_flag[0]
            }

            match &self.long_term_ref_pics {
                Some(entries) => {
                    w.write_bit(true);
                    w.write_exp_golomb(entries.len() as u64);
                    for (poc_lsb, used) in entries {
                        w.write_bits(*poc_lsb as u64, self.log2_max_pic_order_cnt_lsb_minus4 as u32 + 4);
                        w.write_bit(*used);
                    }
                }
                None => w.write_bit(false),
            }

            w.write_bit(true); // sps_temporal_mvp_enabled_flag
            w.write_bit(true); // strong_intra_smoothing_enabled_flag

            w.write_bit(self.vui_parameters_present_flag);
            if self.vui_parameters_present_flag {
                w.write_bits(0, 10); // all optional VUI parts absent
            }

            match self.extension {
                Some((range, multilayer, three_d, scc, extension_4bits)) => {
                    w.write_bit(true);
                    w.write_bit(range);
                    w.write_bit(multilayer);
                    w.write_bit(three_d);
                    w.write_bit(scc);
                    w.write_bits(extension_4bits as u64, 4);
                    if extension_4bits != 0 {
                        w.write_bits(0b1010, 4); // sps_extension_data_flag bits
                    }
                }
                None => w.write_bit(false),
            }

            w.write_bit(true); // rbsp_stop_one_bit
            w.finish()
        }
    }

    /// Inserts emulation prevention bytes the way an encoder would.
    fn escape_rbsp(data: &[u8]) -> Vec<u8> {
        let mut escaped = Vec::with_capacity(data.len());
        for &byte in data {
            if escaped.len() >= 2 && escaped[escaped.len() - 2..] == [0, 0] && byte <= 3 {
                escaped.push(3);
            }
            escaped.push(byte);
        }
        escaped
    }

    fn parse_fixture(builder: &SpsBuilder) -> Result<Sps, SpsError> {
        Sps::parse(&escape_rbsp(&builder.build()))
    }

    #[test]
    fn parse_baseline_1080p() {
        let sps = parse_fixture(&SpsBuilder::default()).unwrap();

        assert_eq!(sps.sps_video_parameter_set_id, 0);
        assert_eq!(sps.sps_max_sub_layers_minus1, 0);
        assert!(sps.sps_temporal_id_nesting_flag);
        assert_eq!(sps.profile_tier_level.general_profile_idc, 1);
        assert_eq!(sps.profile_tier_level.general_level_idc, 120);
        assert_eq!(sps.sps_seq_parameter_set_id, 0);
        assert_eq!(sps.chroma_format_idc, 1);
        assert!(sps.separate_colour_plane_flag.is_none());
        assert_eq!(sps.pic_width_in_luma_samples, 1920);
        assert_eq!(sps.pic_height_in_luma_samples, 1080);
        assert!(sps.conformance_window.is_none());
        assert_eq!(sps.bit_depth_luma_minus8, 0);
        assert_eq!(sps.bit_depth_chroma_minus8, 0);
        assert_eq!(sps.log2_max_pic_order_cnt_lsb_minus4, 0);
        assert_eq!(sps.sub_layer_ordering_info.sps_max_dec_pic_buffering_minus1, vec![4]);
        assert_eq!(sps.sub_layer_ordering_info.sps_max_num_reorder_pics, vec![2]);
        assert!(!sps.scaling_list_enabled_flag);
        assert!(sps.sps_scaling_list_data_present_flag.is_none());
        assert!(sps.amp_enabled_flag);
        assert!(sps.sample_adaptive_offset_enabled_flag);
        assert!(sps.pcm.is_none());
        assert!(sps.st_ref_pic_sets.is_empty());
        assert!(sps.long_term_ref_pics.is_none());
        assert!(sps.sps_temporal_mvp_enabled_flag);
        assert!(sps.strong_intra_smoothing_enabled_flag);
        assert!(sps.vui_parameters.is_none());
        assert!(!sps.sps_extension_present_flag);
    }

    #[test]
    fn derived_values_baseline() {
        let sps = parse_fixture(&SpsBuilder::default()).unwrap();

        assert_eq!(sps.width(), 1920);
        assert_eq!(sps.height(), 1080);
        assert_eq!(sps.sub_width_c(), 2);
        assert_eq!(sps.sub_height_c(), 2);
        assert_eq!(sps.chroma_array_type(), 1);
        assert_eq!(sps.bit_depth_y(), 8);
        assert_eq!(sps.bit_depth_c(), 8);
        assert_eq!(sps.max_pic_order_cnt_lsb(), 16);
        assert_eq!(sps.min_cb_log2_size_y(), 3);
        assert_eq!(sps.ctb_log2_size_y(), 5);
        assert_eq!(sps.ctb_size_y(), 32);
        assert_eq!(sps.pic_width_in_ctbs_y(), 60);
        // 1080 is not a multiple of 32, the bottom row rounds up
        assert_eq!(sps.pic_height_in_ctbs_y(), 34);
        assert_eq!(sps.pic_size_in_ctbs_y(), 2040);
    }

    #[test]
    fn conformance_window_cropping() {
        let sps = parse_fixture(&SpsBuilder {
            pic_height_in_luma_samples: 1088,
            conformance_window: Some([0, 8, 0, 0]),
            ..Default::default()
        })
        .unwrap();

        let window = sps.conformance_window.as_ref().unwrap();
        assert_eq!(window.conf_win_left_offset, 0);
        assert_eq!(window.conf_win_right_offset, 8);
        assert_eq!(window.conf_win_top_offset, 0);
        assert_eq!(window.conf_win_bottom_offset, 0);
        assert_eq!(sps.pic_width_in_luma_samples, 1920);
        assert_eq!(sps.pic_height_in_luma_samples, 1088);
        // 1920 - SubWidthC * 8
        assert_eq!(sps.width(), 1904);
        assert_eq!(sps.height(), 1088);
    }

    #[test]
    fn vertical_cropping() {
        let sps = parse_fixture(&SpsBuilder {
            pic_height_in_luma_samples: 1088,
            conformance_window: Some([0, 0, 0, 4]),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(sps.width(), 1920);
        // 1088 - SubHeightC * 4
        assert_eq!(sps.height(), 1080);
    }

    #[test]
    fn separate_colour_planes() {
        let sps = parse_fixture(&SpsBuilder {
            chroma_format_idc: 3,
            separate_colour_plane_flag: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(sps.chroma_format_idc, 3);
        assert_eq!(sps.separate_colour_plane_flag, Some(true));
        assert_eq!(sps.sub_width_c(), 1);
        assert_eq!(sps.sub_height_c(), 1);
        // separately coded planes decode as monochrome
        assert_eq!(sps.chroma_array_type(), 0);
    }

    #[test]
    fn chroma_format_out_of_range() {
        let err = parse_fixture(&SpsBuilder {
            chroma_format_idc: 4,
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, SpsError::OutOfRange(_)));
    }

    #[test]
    fn every_truncation_fails_cleanly() {
        let payload = escape_rbsp(&SpsBuilder::default().build());

        for len in 0..payload.len() {
            let result = Sps::parse(&payload[..len]);
            assert_eq!(result.unwrap_err(), SpsError::Truncated, "prefix of {len} bytes");
        }
    }

    #[test]
    fn scaling_list_data_rejected() {
        let err = parse_fixture(&SpsBuilder {
            scaling_list_enabled_flag: true,
            sps_scaling_list_data_present_flag: true,
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(err, SpsError::UnsupportedFeature(UnsupportedFeature::ScalingListData));
    }

    #[test]
    fn scaling_list_enabled_without_data() {
        let sps = parse_fixture(&SpsBuilder {
            scaling_list_enabled_flag: true,
            ..Default::default()
        })
        .unwrap();

        assert!(sps.scaling_list_enabled_flag);
        assert_eq!(sps.sps_scaling_list_data_present_flag, Some(false));
    }

    #[test]
    fn too_many_short_term_ref_pic_sets() {
        let err = parse_fixture(&SpsBuilder {
            num_short_term_ref_pic_sets: 65,
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(
            err,
            SpsError::LimitExceeded {
                num_short_term_ref_pic_sets: 65
            }
        );
    }

    #[test]
    fn short_term_ref_pic_sets_parsed() {
        let sps = parse_fixture(&SpsBuilder {
            num_short_term_ref_pic_sets: 3,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(sps.st_ref_pic_sets.len(), 3);
        for set in &sps.st_ref_pic_sets {
            assert!(!set.inter_ref_pic_set_prediction_flag);
            assert_eq!(set.num_negative_pics, 1);
            assert_eq!(set.num_delta_pocs(), 1);
        }
    }

    #[test]
    fn long_term_ref_pics_parsed() {
        let sps = parse_fixture(&SpsBuilder {
            log2_max_pic_order_cnt_lsb_minus4: 4,
            long_term_ref_pics: Some(vec![(100, true), (200, false)]),
            ..Default::default()
        })
        .unwrap();

        let long_term = sps.long_term_ref_pics.as_ref().unwrap();
        assert_eq!(long_term.lt_ref_pic_poc_lsb_sps, vec![100, 200]);
        assert_eq!(long_term.used_by_curr_pic_lt_sps_flag, vec![true, false]);
    }

    #[test]
    fn pcm_parameters_parsed() {
        let sps = parse_fixture(&SpsBuilder {
            pcm_enabled_flag: true,
            ..Default::default()
        })
        .unwrap();

        let pcm = sps.pcm.as_ref().unwrap();
        assert_eq!(pcm.pcm_sample_bit_depth_luma_minus1, 7);
        assert_eq!(pcm.pcm_sample_bit_depth_chroma_minus1, 7);
        assert_eq!(pcm.log2_diff_max_min_pcm_luma_coding_block_size, 2);
        assert!(pcm.pcm_loop_filter_disabled_flag);
    }

    #[test]
    fn sub_layer_ordering_info_per_layer() {
        let sps = parse_fixture(&SpsBuilder {
            max_sub_layers_minus1: 2,
            sub_layer_ordering_info_present_flag: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(sps.sps_max_sub_layers_minus1, 2);
        assert_eq!(sps.sub_layer_ordering_info.sps_max_dec_pic_buffering_minus1, vec![4, 5, 6]);
        assert_eq!(sps.sub_layer_ordering_info.sps_max_num_reorder_pics, vec![2, 2, 2]);
        assert_eq!(sps.profile_tier_level.sub_layer_level_idcs, vec![None, None]);
    }

    #[test]
    fn vui_parameters_present() {
        let sps = parse_fixture(&SpsBuilder {
            vui_parameters_present_flag: true,
            ..Default::default()
        })
        .unwrap();

        let vui = sps.vui_parameters.as_ref().unwrap();
        assert!(vui.vui_timing_info.is_none());
        assert!(vui.bitstream_restriction.motion_vectors_over_pic_boundaries_flag);
    }

    #[test]
    fn range_extension_rejected() {
        // all four extension flags plus the reserved bits are read before
        // any of them is acted on
        let err = parse_fixture(&SpsBuilder {
            extension: Some((true, true, false, true, 0)),
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(err, SpsError::UnsupportedFeature(UnsupportedFeature::RangeExtension));
    }

    #[test]
    fn scc_extension_rejected() {
        let err = parse_fixture(&SpsBuilder {
            extension: Some((false, false, false, true, 0)),
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(err, SpsError::UnsupportedFeature(UnsupportedFeature::SccExtension));
    }

    #[test]
    fn unknown_extension_data_skipped() {
        let sps = parse_fixture(&SpsBuilder {
            extension: Some((false, false, false, false, 0b0001)),
            ..Default::default()
        })
        .unwrap();

        assert!(sps.sps_extension_present_flag);
        assert_eq!(sps.sps_extension_4bits, 0b0001);
    }

    #[test]
    fn extension_present_without_extensions() {
        let sps = parse_fixture(&SpsBuilder {
            extension: Some((false, false, false, false, 0)),
            ..Default::default()
        })
        .unwrap();

        assert!(sps.sps_extension_present_flag);
        assert_eq!(sps.sps_extension_4bits, 0);
    }

    #[test]
    fn emulation_prevention_bytes_removed() {
        let rbsp = SpsBuilder::default().build();
        let escaped = escape_rbsp(&rbsp);

        // the zero run in the profile tier level forces at least one
        // emulation prevention byte
        assert_ne!(escaped, rbsp);

        let sps = Sps::parse(&escaped).unwrap();
        assert_eq!(sps.pic_width_in_luma_samples, 1920);
        assert_eq!(sps.pic_height_in_luma_samples, 1080);
    }
}
