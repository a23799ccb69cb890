//! A pure Rust H.265 sequence parameter set decoder.
//!
//! [`Sps::parse`] takes the payload of a single SPS NAL unit (header bytes
//! already stripped, emulation prevention bytes still in place) and returns
//! every syntax element of ITU-T H.265 (2016-12) - 7.3.2.2, or an
//! [`SpsError`] describing why the payload cannot be decoded.
//!
//! The optional HEVC extensions (range, multilayer, 3D, screen content
//! coding) and the scaling list data block are not decoded; an SPS that
//! carries any of them is rejected with [`SpsError::UnsupportedFeature`].
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]

mod diag;
mod enums;
mod error;
mod range_check;
mod rbsp;
mod sps;

pub use self::enums::{AspectRatioIdc, VideoFormat};
pub use self::error::{Result, SpsError, UnsupportedFeature};
pub use self::rbsp::{more_rbsp_data, rbsp_trailing_bits, unescape_rbsp};
pub use self::sps::{
    AspectRatioInfo, BitstreamRestriction, ChromaLocInfo, CommonInf, ConformanceWindow, DefaultDisplayWindow,
    HrdParameters, LongTermRefPics, Pcm, ProfileTierLevel, Sps, StRefPicSet, SubLayerHrd, SubLayerHrdParameters,
    SubLayerOrderingInfo, SubPicHrdParams, VideoSignalType, VuiParameters, VuiTimingInfo,
};

/// Upper bound on `num_short_term_ref_pic_sets`.
///
/// ITU-T H.265 (2016-12) - 7.4.3.2.1 allows at most 64 short-term reference
/// picture sets in an SPS.
pub const NUM_SHORT_TERM_REF_PIC_SETS_MAX: u64 = 64;
