use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::Result;
use crate::range_check::range_check;
use crate::{AspectRatioIdc, VideoFormat};

mod hrd_parameters;

pub use hrd_parameters::{CommonInf, HrdParameters, SubLayerHrd, SubLayerHrdParameters, SubPicHrdParams};

/// Video usability information.
///
/// Carries display hints only. None of it affects the decoding process.
///
/// ITU-T H.265 (2016-12) - E.2.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VuiParameters {
    /// The sample aspect ratio of the coded pictures.
    pub aspect_ratio_info: AspectRatioInfo,
    /// Whether the pictures are suitable for display in overscan.
    /// `None` when no overscan information is signaled.
    pub overscan_appropriate_flag: Option<bool>,
    /// Video format, range and colour description.
    pub video_signal_type: VideoSignalType,
    /// Chroma sample positions relative to the luma grid.
    pub chroma_loc_info: Option<ChromaLocInfo>,
    /// Whether all chroma samples are equal to the neutral value.
    pub neutral_chroma_indication_flag: bool,
    /// Whether the coded video sequence conveys fields.
    pub field_seq_flag: bool,
    /// Whether picture timing SEI messages carry frame/field information.
    pub frame_field_info_present_flag: bool,
    /// The default display window, present when
    /// `default_display_window_flag == 1`.
    pub default_display_window: Option<DefaultDisplayWindow>,
    /// Timing information and HRD parameters.
    pub vui_timing_info: Option<VuiTimingInfo>,
    /// Bitstream restriction fields, with inferred defaults when absent.
    pub bitstream_restriction: BitstreamRestriction,
}

impl VuiParameters {
    pub(crate) fn parse(reader: &mut BitReader<'_>, sps_max_sub_layers_minus1: u8) -> Result<Self> {
        let mut aspect_ratio_info = AspectRatioInfo::Predefined(AspectRatioIdc::Unspecified);
        let mut overscan_appropriate_flag = None;
        let mut video_signal_type = None;
        let mut chroma_loc_info = None;
        let mut default_display_window = None;
        let mut vui_timing_info = None;

        let aspect_ratio_info_present_flag = reader.read_bit()?;
        if aspect_ratio_info_present_flag {
            let aspect_ratio_idc = reader.read_bits(8)? as u8;
            if aspect_ratio_idc == AspectRatioIdc::ExtendedSar.0 {
                let sar_width = reader.read_bits(16)? as u16;
                let sar_height = reader.read_bits(16)? as u16;
                aspect_ratio_info = AspectRatioInfo::ExtendedSar { sar_width, sar_height };
            } else {
                aspect_ratio_info = AspectRatioInfo::Predefined(aspect_ratio_idc.into());
            }
        }

        let overscan_info_present_flag = reader.read_bit()?;
        if overscan_info_present_flag {
            overscan_appropriate_flag = Some(reader.read_bit()?);
        }

        let video_signal_type_present_flag = reader.read_bit()?;
        if video_signal_type_present_flag {
            let video_format = VideoFormat::from(reader.read_bits(3)? as u8);
            let video_full_range_flag = reader.read_bit()?;
            let colour_description_present_flag = reader.read_bit()?;

            if colour_description_present_flag {
                let colour_primaries = reader.read_bits(8)? as u8;
                let transfer_characteristics = reader.read_bits(8)? as u8;
                let matrix_coeffs = reader.read_bits(8)? as u8;

                video_signal_type = Some(VideoSignalType {
                    video_format,
                    video_full_range_flag,
                    colour_primaries,
                    transfer_characteristics,
                    matrix_coeffs,
                });
            } else {
                video_signal_type = Some(VideoSignalType {
                    video_format,
                    video_full_range_flag,
                    ..Default::default()
                });
            }
        }

        let chroma_loc_info_present_flag = reader.read_bit()?;
        if chroma_loc_info_present_flag {
            chroma_loc_info = Some(ChromaLocInfo {
                top_field: reader.read_exp_golomb()?,
                bottom_field: reader.read_exp_golomb()?,
            });
        }

        let neutral_chroma_indication_flag = reader.read_bit()?;
        let field_seq_flag = reader.read_bit()?;
        let frame_field_info_present_flag = reader.read_bit()?;

        let default_display_window_flag = reader.read_bit()?;
        if default_display_window_flag {
            default_display_window = Some(DefaultDisplayWindow {
                def_disp_win_left_offset: reader.read_exp_golomb()?,
                def_disp_win_right_offset: reader.read_exp_golomb()?,
                def_disp_win_top_offset: reader.read_exp_golomb()?,
                def_disp_win_bottom_offset: reader.read_exp_golomb()?,
            });
        }

        let vui_timing_info_present_flag = reader.read_bit()?;
        if vui_timing_info_present_flag {
            let vui_num_units_in_tick = reader.read_bits(32)? as u32;
            let vui_time_scale = reader.read_bits(32)? as u32;

            let mut num_ticks_poc_diff_one_minus1 = None;
            let vui_poc_proportional_to_timing_flag = reader.read_bit()?;
            if vui_poc_proportional_to_timing_flag {
                let vui_num_ticks_poc_diff_one_minus1 = reader.read_exp_golomb()?;
                range_check!(vui_num_ticks_poc_diff_one_minus1, 0, 2u64.pow(32) - 2)?;
                num_ticks_poc_diff_one_minus1 = Some(vui_num_ticks_poc_diff_one_minus1 as u32);
            }

            let mut vui_hrd_parameters = None;
            let vui_hrd_parameters_present_flag = reader.read_bit()?;
            if vui_hrd_parameters_present_flag {
                vui_hrd_parameters = Some(HrdParameters::parse(reader, true, sps_max_sub_layers_minus1)?);
            }

            vui_timing_info = Some(VuiTimingInfo {
                num_units_in_tick: vui_num_units_in_tick,
                time_scale: vui_time_scale,
                num_ticks_poc_diff_one_minus1,
                hrd_parameters: vui_hrd_parameters,
            });
        }

        let mut bitstream_restriction = BitstreamRestriction::default();
        let bitstream_restriction_flag = reader.read_bit()?;
        if bitstream_restriction_flag {
            bitstream_restriction.tiles_fixed_structure_flag = reader.read_bit()?;
            bitstream_restriction.motion_vectors_over_pic_boundaries_flag = reader.read_bit()?;
            bitstream_restriction.restricted_ref_pic_lists_flag = Some(reader.read_bit()?);

            let min_spatial_segmentation_idc = reader.read_exp_golomb()?;
            range_check!(min_spatial_segmentation_idc, 0, 4095)?;
            bitstream_restriction.min_spatial_segmentation_idc = min_spatial_segmentation_idc as u16;

            let max_bytes_per_pic_denom = reader.read_exp_golomb()?;
            range_check!(max_bytes_per_pic_denom, 0, 16)?;
            bitstream_restriction.max_bytes_per_pic_denom = max_bytes_per_pic_denom as u8;

            let max_bits_per_min_cu_denom = reader.read_exp_golomb()?;
            range_check!(max_bits_per_min_cu_denom, 0, 16)?;
            bitstream_restriction.max_bits_per_min_cu_denom = max_bits_per_min_cu_denom as u8;

            let log2_max_mv_length_horizontal = reader.read_exp_golomb()?;
            range_check!(log2_max_mv_length_horizontal, 0, 15)?;
            bitstream_restriction.log2_max_mv_length_horizontal = log2_max_mv_length_horizontal as u8;

            let log2_max_mv_length_vertical = reader.read_exp_golomb()?;
            range_check!(log2_max_mv_length_vertical, 0, 15)?;
            bitstream_restriction.log2_max_mv_length_vertical = log2_max_mv_length_vertical as u8;
        }

        Ok(Self {
            aspect_ratio_info,
            overscan_appropriate_flag,
            video_signal_type: video_signal_type.unwrap_or_default(),
            chroma_loc_info,
            neutral_chroma_indication_flag,
            field_seq_flag,
            frame_field_info_present_flag,
            default_display_window,
            vui_timing_info,
            bitstream_restriction,
        })
    }
}

/// The sample aspect ratio, either one of the Table E.1 entries or an
/// explicit width and height when `aspect_ratio_idc == 255`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AspectRatioInfo {
    /// One of the predefined aspect ratios of Table E.1.
    Predefined(AspectRatioIdc),
    /// An explicitly coded sample aspect ratio.
    ExtendedSar {
        /// The horizontal size of the sample aspect ratio.
        sar_width: u16,
        /// The vertical size of the sample aspect ratio.
        sar_height: u16,
    },
}

/// Video format, range and colour description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSignalType {
    /// The `video_format` bits as an enum.
    pub video_format: VideoFormat,
    /// The `video_full_range_flag` as a bool.
    pub video_full_range_flag: bool,
    /// The `colour_primaries` bits as a u8.
    pub colour_primaries: u8,
    /// The `transfer_characteristics` bits as a u8.
    pub transfer_characteristics: u8,
    /// The `matrix_coeffs` bits as a u8.
    pub matrix_coeffs: u8,
}

impl Default for VideoSignalType {
    fn default() -> Self {
        Self {
            video_format: VideoFormat::Unspecified,
            video_full_range_flag: false,
            colour_primaries: 2,
            transfer_characteristics: 2,
            matrix_coeffs: 2,
        }
    }
}

/// Chroma sample positions for the top and bottom fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromaLocInfo {
    /// `chroma_sample_loc_type_top_field`
    pub top_field: u64,
    /// `chroma_sample_loc_type_bottom_field`
    pub bottom_field: u64,
}

/// The default display window offsets, in the same units as the
/// conformance window offsets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefaultDisplayWindow {
    /// Left offset of the display window.
    pub def_disp_win_left_offset: u64,
    /// Right offset of the display window.
    pub def_disp_win_right_offset: u64,
    /// Top offset of the display window.
    pub def_disp_win_top_offset: u64,
    /// Bottom offset of the display window.
    pub def_disp_win_bottom_offset: u64,
}

/// Timing information for the coded video sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VuiTimingInfo {
    /// The number of time units of the clock operating at `time_scale` Hz
    /// that corresponds to one increment of the clock tick counter.
    pub num_units_in_tick: u32,
    /// The number of time units that pass in one second.
    pub time_scale: u32,
    /// The number of clock ticks corresponding to a picture order count
    /// difference of 1, minus 1.
    pub num_ticks_poc_diff_one_minus1: Option<u32>,
    /// HRD parameters, present when `vui_hrd_parameters_present_flag == 1`.
    pub hrd_parameters: Option<HrdParameters>,
}

/// Bitstream restriction fields.
///
/// When `bitstream_restriction_flag == 0` the inferred defaults of
/// E.3.1 apply, which [`Default`] provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitstreamRestriction {
    /// Whether all pictures use the same tile layout.
    pub tiles_fixed_structure_flag: bool,
    /// Whether motion vectors may point outside picture boundaries.
    pub motion_vectors_over_pic_boundaries_flag: bool,
    /// Whether reference picture lists are restricted across slices.
    /// `None` when the restriction fields are absent.
    pub restricted_ref_pic_lists_flag: Option<bool>,
    /// The maximum spatial segmentation, as an idc in `[0, 4095]`.
    pub min_spatial_segmentation_idc: u16,
    /// Denominator bounding the bytes of any coded picture.
    pub max_bytes_per_pic_denom: u8,
    /// Denominator bounding the bits of any coding unit.
    pub max_bits_per_min_cu_denom: u8,
    /// The maximum absolute horizontal motion vector component, as a log2.
    pub log2_max_mv_length_horizontal: u8,
    /// The maximum absolute vertical motion vector component, as a log2.
    pub log2_max_mv_length_vertical: u8,
}

impl Default for BitstreamRestriction {
    fn default() -> Self {
        Self {
            tiles_fixed_structure_flag: false,
            motion_vectors_over_pic_boundaries_flag: true,
            restricted_ref_pic_lists_flag: None,
            min_spatial_segmentation_idc: 0,
            max_bytes_per_pic_denom: 2,
            max_bits_per_min_cu_denom: 1,
            log2_max_mv_length_horizontal: 15,
            log2_max_mv_length_vertical: 15,
        }
    }
}
