use strobe_bytes_util::BitReader;

use crate::Result;

/// The profile, tier and level signaled for the coded video sequence.
///
/// Sub-layer profile and level information is consumed from the bitstream
/// so that parsing stays aligned, but only the sub-layer level indicators
/// are retained.
///
/// ITU-T H.265 (2016-12) - 7.3.3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTierLevel {
    /// Specifies the context for the interpretation of `general_profile_idc`.
    pub general_profile_space: u8,
    /// The tier context for the interpretation of `general_level_idc`.
    pub general_tier_flag: bool,
    /// The profile to which the coded video sequence conforms.
    pub general_profile_idc: u8,
    /// `general_profile_compatibility_flag[j]` for `j` in 0..32, packed with
    /// flag 0 in the most significant bit.
    pub general_profile_compatibility_flags: u32,
    /// Whether the source was progressive scan.
    pub general_progressive_source_flag: bool,
    /// Whether the source was interlaced scan.
    pub general_interlaced_source_flag: bool,
    /// Whether frame packing arrangements are absent.
    pub general_non_packed_constraint_flag: bool,
    /// Whether the sequence contains only frames (no field pictures).
    pub general_frame_only_constraint_flag: bool,
    /// The level to which the coded video sequence conforms.
    pub general_level_idc: u8,
    /// `sub_layer_profile_present_flag[i]` for each sub-layer.
    pub sub_layer_profile_present_flags: Vec<bool>,
    /// `sub_layer_level_present_flag[i]` for each sub-layer.
    pub sub_layer_level_present_flags: Vec<bool>,
    /// `sub_layer_level_idc[i]`, present only when the matching level
    /// present flag is set.
    pub sub_layer_level_idcs: Vec<Option<u8>>,
}

impl ProfileTierLevel {
    pub(crate) fn parse(reader: &mut BitReader<'_>, max_num_sub_layers_minus1: u8) -> Result<Self> {
        let general_profile_space = reader.read_bits(2)? as u8;
        let general_tier_flag = reader.read_bit()?;
        let general_profile_idc = reader.read_bits(5)? as u8;
        let general_profile_compatibility_flags = reader.read_bits(32)? as u32;
        let general_progressive_source_flag = reader.read_bit()?;
        let general_interlaced_source_flag = reader.read_bit()?;
        let general_non_packed_constraint_flag = reader.read_bit()?;
        let general_frame_only_constraint_flag = reader.read_bit()?;

        // general_reserved_zero_43bits and general_inbld_flag (which shares
        // the position of general_reserved_zero_bit).
        reader.read_bits(43)?;
        reader.read_bit()?;

        let general_level_idc = reader.read_bits(8)? as u8;

        let mut sub_layer_profile_present_flags = Vec::with_capacity(max_num_sub_layers_minus1 as usize);
        let mut sub_layer_level_present_flags = Vec::with_capacity(max_num_sub_layers_minus1 as usize);
        for _ in 0..max_num_sub_layers_minus1 {
            sub_layer_profile_present_flags.push(reader.read_bit()?);
            sub_layer_level_present_flags.push(reader.read_bit()?);
        }

        if max_num_sub_layers_minus1 > 0 {
            // reserved_zero_2bits, padding the flag pairs to a byte boundary
            for _ in max_num_sub_layers_minus1..8 {
                reader.read_bits(2)?;
            }
        }

        let mut sub_layer_level_idcs = Vec::with_capacity(max_num_sub_layers_minus1 as usize);
        for i in 0..max_num_sub_layers_minus1 as usize {
            if sub_layer_profile_present_flags[i] {
                // sub_layer_profile_space through sub_layer_reserved_zero_bit,
                // 88 bits in total, consumed but not retained
                reader.read_bits(32)?;
                reader.read_bits(32)?;
                reader.read_bits(24)?;
            }

            if sub_layer_level_present_flags[i] {
                sub_layer_level_idcs.push(Some(reader.read_bits(8)? as u8));
            } else {
                sub_layer_level_idcs.push(None);
            }
        }

        Ok(ProfileTierLevel {
            general_profile_space,
            general_tier_flag,
            general_profile_idc,
            general_profile_compatibility_flags,
            general_progressive_source_flag,
            general_interlaced_source_flag,
            general_non_packed_constraint_flag,
            general_frame_only_constraint_flag,
            general_level_idc,
            sub_layer_profile_present_flags,
            sub_layer_level_present_flags,
            sub_layer_level_idcs,
        })
    }
}
