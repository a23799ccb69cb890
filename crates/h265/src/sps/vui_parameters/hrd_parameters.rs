use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::Result;
use crate::range_check::range_check;

/// HRD parameters.
///
/// ITU-T H.265 (2016-12) - E.2.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrdParameters {
    /// The common information block, present when
    /// `commonInfPresentFlag == 1` and at least one of the NAL and VCL
    /// HRD parameter sets is signaled.
    pub common_inf: Option<CommonInf>,
    /// One entry per sub-layer, for sub-layers 0 through
    /// `maxNumSubLayersMinus1` inclusive.
    pub sub_layers: Vec<SubLayerHrd>,
}

impl HrdParameters {
    pub(crate) fn parse(
        reader: &mut BitReader<'_>,
        common_inf_present_flag: bool,
        max_num_sub_layers_minus1: u8,
    ) -> Result<Self> {
        let mut common_inf = None;

        let mut nal_hrd_parameters_present_flag = false;
        let mut vcl_hrd_parameters_present_flag = false;

        if common_inf_present_flag {
            nal_hrd_parameters_present_flag = reader.read_bit()?;
            vcl_hrd_parameters_present_flag = reader.read_bit()?;

            if nal_hrd_parameters_present_flag || vcl_hrd_parameters_present_flag {
                let mut sub_pic_hrd_params = None;

                let sub_pic_hrd_params_present_flag = reader.read_bit()?;
                if sub_pic_hrd_params_present_flag {
                    let tick_divisor_minus2 = reader.read_bits(8)? as u8;
                    let du_cpb_removal_delay_increment_length_minus1 = reader.read_bits(5)? as u8;
                    let sub_pic_cpb_params_in_pic_timing_sei_flag = reader.read_bit()?;
                    let dpb_output_delay_du_length_minus1 = reader.read_bits(5)? as u8;

                    sub_pic_hrd_params = Some(SubPicHrdParams {
                        tick_divisor_minus2,
                        du_cpb_removal_delay_increment_length_minus1,
                        sub_pic_cpb_params_in_pic_timing_sei_flag,
                        dpb_output_delay_du_length_minus1,
                        cpb_size_du_scale: 0, // will be replaced
                    });
                }

                let bit_rate_scale = reader.read_bits(4)? as u8;
                let cpb_size_scale = reader.read_bits(4)? as u8;

                if sub_pic_hrd_params_present_flag {
                    let cpb_size_du_scale = reader.read_bits(4)? as u8;

                    if let Some(ref mut sub_pic_hrd_params) = sub_pic_hrd_params {
                        sub_pic_hrd_params.cpb_size_du_scale = cpb_size_du_scale;
                    }
                }

                let initial_cpb_removal_delay_length_minus1 = reader.read_bits(5)? as u8;
                let au_cpb_removal_delay_length_minus1 = reader.read_bits(5)? as u8;
                let dpb_output_delay_length_minus1 = reader.read_bits(5)? as u8;

                common_inf = Some(CommonInf {
                    sub_pic_hrd_params,
                    bit_rate_scale,
                    cpb_size_scale,
                    initial_cpb_removal_delay_length_minus1,
                    au_cpb_removal_delay_length_minus1,
                    dpb_output_delay_length_minus1,
                });
            }
        }

        let sub_pic_hrd_params_present_flag = common_inf.as_ref().is_some_and(|i| i.sub_pic_hrd_params.is_some());

        let mut sub_layers = Vec::with_capacity(max_num_sub_layers_minus1 as usize + 1);

        for _ in 0..=max_num_sub_layers_minus1 {
            let mut fixed_pic_rate_within_cvs_flag = true;

            let fixed_pic_rate_general_flag = reader.read_bit()?;
            if !fixed_pic_rate_general_flag {
                fixed_pic_rate_within_cvs_flag = reader.read_bit()?;
            }

            let mut elemental_duration_in_tc_minus1 = None;
            let mut low_delay_hrd_flag = false;
            if fixed_pic_rate_within_cvs_flag {
                elemental_duration_in_tc_minus1 = Some(reader.read_exp_golomb()?);
            } else {
                low_delay_hrd_flag = reader.read_bit()?;
            }

            let mut cpb_cnt_minus1 = 0;
            if !low_delay_hrd_flag {
                cpb_cnt_minus1 = reader.read_exp_golomb()?;
                range_check!(cpb_cnt_minus1, 0, 31)?;
            }

            let mut nal_hrd = Vec::new();
            if nal_hrd_parameters_present_flag {
                nal_hrd = SubLayerHrdParameters::parse(reader, cpb_cnt_minus1 + 1, sub_pic_hrd_params_present_flag)?;
            }

            let mut vcl_hrd = Vec::new();
            if vcl_hrd_parameters_present_flag {
                vcl_hrd = SubLayerHrdParameters::parse(reader, cpb_cnt_minus1 + 1, sub_pic_hrd_params_present_flag)?;
            }

            sub_layers.push(SubLayerHrd {
                fixed_pic_rate_general_flag,
                fixed_pic_rate_within_cvs_flag,
                elemental_duration_in_tc_minus1,
                low_delay_hrd_flag,
                cpb_cnt_minus1,
                nal_hrd,
                vcl_hrd,
            });
        }

        Ok(HrdParameters { common_inf, sub_layers })
    }
}

/// The `commonInfPresentFlag == 1` portion of the HRD parameters.
///
/// ITU-T H.265 (2016-12) - E.3.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonInf {
    /// Sub-picture HRD parameters, present when
    /// `sub_pic_hrd_params_present_flag == 1`.
    pub sub_pic_hrd_params: Option<SubPicHrdParams>,
    /// Scale factor for the maximum input bit rate.
    pub bit_rate_scale: u8,
    /// Scale factor for the CPB size.
    pub cpb_size_scale: u8,
    /// Bit length of `initial_cpb_removal_delay` and
    /// `initial_cpb_removal_offset`, minus 1.
    pub initial_cpb_removal_delay_length_minus1: u8,
    /// Bit length of `cpb_delay_offset` and `au_cpb_removal_delay_minus1`, minus 1.
    pub au_cpb_removal_delay_length_minus1: u8,
    /// Bit length of `dpb_delay_offset` and `pic_dpb_output_delay`, minus 1.
    pub dpb_output_delay_length_minus1: u8,
}

/// Sub-picture HRD parameters.
///
/// ITU-T H.265 (2016-12) - E.3.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPicHrdParams {
    /// Used to compute the clock sub-tick.
    pub tick_divisor_minus2: u8,
    /// Bit length of `du_cpb_removal_delay_increment_minus1` and
    /// `du_common_cpb_removal_delay_increment_minus1`, minus 1.
    pub du_cpb_removal_delay_increment_length_minus1: u8,
    /// Whether sub-picture CPB parameters are carried in picture timing SEI messages.
    pub sub_pic_cpb_params_in_pic_timing_sei_flag: bool,
    /// Bit length of `pic_dpb_output_du_delay`, minus 1.
    pub dpb_output_delay_du_length_minus1: u8,
    /// Scale factor for the decoding-unit CPB size.
    pub cpb_size_du_scale: u8,
}

/// The per-sub-layer portion of the HRD parameters.
///
/// ITU-T H.265 (2016-12) - E.2.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLayerHrd {
    /// Whether the temporal distance between HRD output times is constrained
    /// for this sub-layer.
    pub fixed_pic_rate_general_flag: bool,
    /// Like the general flag, but scoped to the coded video sequence.
    /// Inferred as `true` when `fixed_pic_rate_general_flag == 1`.
    pub fixed_pic_rate_within_cvs_flag: bool,
    /// The temporal distance between HRD output times, in clock ticks, minus 1.
    /// Present only when `fixed_pic_rate_within_cvs_flag == 1`.
    pub elemental_duration_in_tc_minus1: Option<u64>,
    /// Whether this sub-layer may operate in low-delay mode.
    pub low_delay_hrd_flag: bool,
    /// The number of alternative CPB specifications minus 1, in `[0, 31]`.
    pub cpb_cnt_minus1: u64,
    /// NAL HRD parameters, one entry per CPB specification.
    pub nal_hrd: Vec<SubLayerHrdParameters>,
    /// VCL HRD parameters, one entry per CPB specification.
    pub vcl_hrd: Vec<SubLayerHrdParameters>,
}

/// Sub-layer HRD parameters for one CPB specification.
///
/// ITU-T H.265 (2016-12) - E.2.3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubLayerHrdParameters {
    /// The maximum input bit rate for this CPB, before scaling.
    pub bit_rate_value_minus1: u64,
    /// The size of this CPB, before scaling.
    pub cpb_size_value_minus1: u64,
    /// The decoding-unit CPB size, present in sub-picture HRD mode.
    pub cpb_size_du_value_minus1: Option<u64>,
    /// The decoding-unit bit rate, present in sub-picture HRD mode.
    pub bit_rate_du_value_minus1: Option<u64>,
    /// Whether this CPB operates in constant bit rate mode.
    pub cbr_flag: bool,
}

impl SubLayerHrdParameters {
    fn parse(
        reader: &mut BitReader<'_>,
        cpb_cnt: u64,
        sub_pic_hrd_params_present_flag: bool,
    ) -> Result<Vec<Self>> {
        let mut parameters = Vec::with_capacity(cpb_cnt as usize);

        for _ in 0..cpb_cnt {
            let bit_rate_value_minus1 = reader.read_exp_golomb()?;
            let cpb_size_value_minus1 = reader.read_exp_golomb()?;

            let mut cpb_size_du_value_minus1 = None;
            let mut bit_rate_du_value_minus1 = None;
            if sub_pic_hrd_params_present_flag {
                cpb_size_du_value_minus1 = Some(reader.read_exp_golomb()?);
                bit_rate_du_value_minus1 = Some(reader.read_exp_golomb()?);
            }

            let cbr_flag = reader.read_bit()?;

            parameters.push(Self {
                bit_rate_value_minus1,
                cpb_size_value_minus1,
                cpb_size_du_value_minus1,
                bit_rate_du_value_minus1,
                cbr_flag,
            });
        }

        Ok(parameters)
    }
}
