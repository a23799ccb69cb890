use strobe_bytes_util::BitReader;
use strobe_expgolomb::BitReaderExpGolombExt;

use crate::Result;
use crate::range_check::range_check;

/// A short-term reference picture set.
///
/// A set may be coded directly (the delta POC lists) or predicted from an
/// earlier set in the same SPS via `inter_ref_pic_set_prediction_flag`.
/// Predicted sets retain the prediction syntax elements rather than the
/// expanded picture lists.
///
/// ITU-T H.265 (2016-12) - 7.3.7 and 7.4.8
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StRefPicSet {
    /// Whether this set is predicted from a previously parsed set.
    ///
    /// Can only be set for `stRpsIdx > 0`.
    pub inter_ref_pic_set_prediction_flag: bool,
    /// Index delta to the reference set, `RefRpsIdx == stRpsIdx - (delta_idx_minus1 + 1)`.
    ///
    /// Only coded when `stRpsIdx == num_short_term_ref_pic_sets`; inferred
    /// as 0 otherwise.
    pub delta_idx_minus1: u64,
    /// The sign of `deltaRps`.
    pub delta_rps_sign: bool,
    /// The absolute value of `deltaRps` minus 1.
    pub abs_delta_rps_minus1: u64,
    /// `used_by_curr_pic_flag[j]` for `j` in `0..=NumDeltaPocs[RefRpsIdx]`.
    pub used_by_curr_pic_flags: Vec<bool>,
    /// `use_delta_flag[j]`, inferred as `true` when not coded.
    pub use_delta_flags: Vec<bool>,
    /// The number of entries with negative POC deltas.
    pub num_negative_pics: u64,
    /// The number of entries with positive POC deltas.
    pub num_positive_pics: u64,
    /// `delta_poc_s0_minus1[i]` for each negative entry.
    pub delta_poc_s0_minus1: Vec<u64>,
    /// `used_by_curr_pic_s0_flag[i]` for each negative entry.
    pub used_by_curr_pic_s0_flags: Vec<bool>,
    /// `delta_poc_s1_minus1[i]` for each positive entry.
    pub delta_poc_s1_minus1: Vec<u64>,
    /// `used_by_curr_pic_s1_flag[i]` for each positive entry.
    pub used_by_curr_pic_s1_flags: Vec<bool>,
}

impl StRefPicSet {
    pub(crate) fn parse(
        reader: &mut BitReader<'_>,
        st_rps_idx: u64,
        num_short_term_ref_pic_sets: u64,
        parsed: &[StRefPicSet],
    ) -> Result<Self> {
        let mut set = StRefPicSet::default();

        if st_rps_idx != 0 {
            set.inter_ref_pic_set_prediction_flag = reader.read_bit()?;
        }

        if set.inter_ref_pic_set_prediction_flag {
            if st_rps_idx == num_short_term_ref_pic_sets {
                set.delta_idx_minus1 = reader.read_exp_golomb()?;
                range_check!(set.delta_idx_minus1, 0, st_rps_idx - 1)?;
            }

            set.delta_rps_sign = reader.read_bit()?;
            set.abs_delta_rps_minus1 = reader.read_exp_golomb()?;

            let ref_rps_idx = st_rps_idx - (set.delta_idx_minus1 + 1);
            let ref_num_delta_pocs = parsed[ref_rps_idx as usize].num_delta_pocs();

            for _ in 0..=ref_num_delta_pocs {
                let used_by_curr_pic_flag = reader.read_bit()?;
                set.used_by_curr_pic_flags.push(used_by_curr_pic_flag);
                if !used_by_curr_pic_flag {
                    set.use_delta_flags.push(reader.read_bit()?);
                } else {
                    set.use_delta_flags.push(true);
                }
            }
        } else {
            set.num_negative_pics = reader.read_exp_golomb()?;
            set.num_positive_pics = reader.read_exp_golomb()?;

            for _ in 0..set.num_negative_pics {
                set.delta_poc_s0_minus1.push(reader.read_exp_golomb()?);
                set.used_by_curr_pic_s0_flags.push(reader.read_bit()?);
            }

            for _ in 0..set.num_positive_pics {
                set.delta_poc_s1_minus1.push(reader.read_exp_golomb()?);
                set.used_by_curr_pic_s1_flags.push(reader.read_bit()?);
            }
        }

        Ok(set)
    }

    /// `NumDeltaPocs` for this set.
    ///
    /// For a predicted set this counts the entries carried over from the
    /// reference set. For a directly coded set it is
    /// `num_negative_pics + num_positive_pics`.
    ///
    /// ITU-T H.265 (2016-12) - 7.4.8
    pub fn num_delta_pocs(&self) -> u64 {
        if self.inter_ref_pic_set_prediction_flag {
            self.used_by_curr_pic_flags
                .iter()
                .zip(self.use_delta_flags.iter())
                .filter(|&(&used, &use_delta)| used || use_delta)
                .count() as u64
        } else {
            self.num_negative_pics + self.num_positive_pics
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use strobe_bytes_util::{BitReader, BitWriter};
    use strobe_expgolomb::BitWriterExpGolombExt;

    use super::StRefPicSet;

    #[test]
    fn parse_direct_set() {
        let mut writer = BitWriter::new();
        writer.write_exp_golomb(2); // num_negative_pics
        writer.write_exp_golomb(1); // num_positive_pics
        writer.write_exp_golomb(0); // delta_poc_s0_minus1[0]
        writer.write_bit(true);
        writer.write_exp_golomb(3); // delta_poc_s0_minus1[1]
        writer.write_bit(false);
        writer.write_exp_golomb(1); // delta_poc_s1_minus1[0]
        writer.write_bit(true);
        let data = writer.finish();

        let mut reader = BitReader::new(&data);
        let set = StRefPicSet::parse(&mut reader, 0, 4, &[]).unwrap();

        assert!(!set.inter_ref_pic_set_prediction_flag);
        assert_eq!(set.num_negative_pics, 2);
        assert_eq!(set.num_positive_pics, 1);
        assert_eq!(set.delta_poc_s0_minus1, vec![0, 3]);
        assert_eq!(set.used_by_curr_pic_s0_flags, vec![true, false]);
        assert_eq!(set.delta_poc_s1_minus1, vec![1]);
        assert_eq!(set.num_delta_pocs(), 3);
    }

    #[test]
    fn parse_predicted_set() {
        let reference = StRefPicSet {
            num_negative_pics: 1,
            num_positive_pics: 1,
            ..StRefPicSet::default()
        };
        assert_eq!(reference.num_delta_pocs(), 2);

        let mut writer = BitWriter::new();
        writer.write_bit(true); // inter_ref_pic_set_prediction_flag
        writer.write_bit(false); // delta_rps_sign
        writer.write_exp_golomb(0); // abs_delta_rps_minus1
        // NumDeltaPocs[ref] + 1 == 3 entries
        writer.write_bit(true); // used_by_curr_pic_flag[0]
        writer.write_bit(false); // used_by_curr_pic_flag[1]
        writer.write_bit(true); // use_delta_flag[1]
        writer.write_bit(false); // used_by_curr_pic_flag[2]
        writer.write_bit(false); // use_delta_flag[2]
        let data = writer.finish();

        let mut reader = BitReader::new(&data);
        let set = StRefPicSet::parse(&mut reader, 1, 4, std::slice::from_ref(&reference)).unwrap();

        assert!(set.inter_ref_pic_set_prediction_flag);
        assert_eq!(set.used_by_curr_pic_flags, vec![true, false, false]);
        assert_eq!(set.use_delta_flags, vec![true, true, false]);
        // entries 0 and 1 survive, entry 2 is dropped
        assert_eq!(set.num_delta_pocs(), 2);
    }

    #[test]
    fn delta_idx_out_of_range() {
        let mut writer = BitWriter::new();
        writer.write_bit(true); // inter_ref_pic_set_prediction_flag
        writer.write_exp_golomb(2); // delta_idx_minus1, would point before set 0
        writer.write_bit(false);
        writer.write_exp_golomb(0);
        let data = writer.finish();

        let mut reader = BitReader::new(&data);
        // stRpsIdx == num_short_term_ref_pic_sets, so delta_idx_minus1 is coded
        let err = StRefPicSet::parse(&mut reader, 2, 2, &[StRefPicSet::default(), StRefPicSet::default()])
            .unwrap_err();
        assert!(matches!(err, crate::SpsError::OutOfRange(_)));
    }
}
