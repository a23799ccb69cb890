//! SPS parse error type.

use std::fmt;

use strobe_bytes_util::EndOfData;
use strobe_expgolomb::ExpGolombError;

use crate::NUM_SHORT_TERM_REF_PIC_SETS_MAX;

/// Result type.
pub type Result<T, E = SpsError> = std::result::Result<T, E>;

/// Why an SPS payload could not be decoded.
///
/// Every variant is fatal to the parse; the caller never receives a partial
/// [`Sps`](crate::Sps).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpsError {
    /// A bit-level read ran past the end of the RBSP.
    #[error("bitstream ended before the syntax element could be read")]
    Truncated,
    /// An Exp-Golomb leading-zero run exceeded the 32-bit limit.
    #[error("exp-golomb code exceeds the 32-bit leading-zero limit")]
    ExpGolombOverflow,
    /// `num_short_term_ref_pic_sets` exceeded [`NUM_SHORT_TERM_REF_PIC_SETS_MAX`].
    #[error(
        "num_short_term_ref_pic_sets is {num_short_term_ref_pic_sets}, the maximum is {NUM_SHORT_TERM_REF_PIC_SETS_MAX}"
    )]
    LimitExceeded {
        /// The value read from the bitstream.
        num_short_term_ref_pic_sets: u64,
    },
    /// The SPS carries a syntax structure this crate does not decode.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(UnsupportedFeature),
    /// A syntax element violated its allowed range.
    #[error("{0}")]
    OutOfRange(String),
}

impl From<EndOfData> for SpsError {
    fn from(_: EndOfData) -> Self {
        SpsError::Truncated
    }
}

impl From<ExpGolombError> for SpsError {
    fn from(err: ExpGolombError) -> Self {
        match err {
            ExpGolombError::EndOfData(_) => SpsError::Truncated,
            ExpGolombError::LeadingZerosOverflow => SpsError::ExpGolombOverflow,
        }
    }
}

/// The syntax structures that are recognized but not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedFeature {
    /// `scaling_list_data()` - 7.3.4
    ScalingListData,
    /// `sps_range_extension()` - 7.3.2.2.2
    RangeExtension,
    /// `sps_multilayer_extension()` - Annex F
    MultilayerExtension,
    /// `sps_3d_extension()` - Annex I
    Sps3dExtension,
    /// `sps_scc_extension()` - 7.3.2.2.3
    SccExtension,
}

impl fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnsupportedFeature::ScalingListData => "scaling_list_data()",
            UnsupportedFeature::RangeExtension => "sps_range_extension()",
            UnsupportedFeature::MultilayerExtension => "sps_multilayer_extension()",
            UnsupportedFeature::Sps3dExtension => "sps_3d_extension()",
            UnsupportedFeature::SccExtension => "sps_scc_extension()",
        })
    }
}
