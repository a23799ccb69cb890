macro_rules! range_check {
    ($n:expr, 0, $upper:expr) => {{
        if $n > $upper {
            ::std::result::Result::Err($crate::SpsError::OutOfRange(::std::format!(
                "{} is out of range [0, {}]: {}",
                stringify!($n),
                $upper,
                $n
            )))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
    ($n:expr, $lower:expr, $upper:expr) => {{
        if $n < $lower || $n > $upper {
            ::std::result::Result::Err($crate::SpsError::OutOfRange(::std::format!(
                "{} is out of range [{}, {}]: {}",
                stringify!($n),
                $lower,
                $upper,
                $n
            )))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}

pub(crate) use range_check;

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use crate::SpsError;

    #[test]
    fn in_range() {
        let chroma_format_idc = 3u64;
        range_check!(chroma_format_idc, 0, 3).unwrap();
    }

    #[test]
    fn out_of_range() {
        let chroma_format_idc = 4u64;
        let err = range_check!(chroma_format_idc, 0, 3).unwrap_err();
        assert_eq!(
            err,
            SpsError::OutOfRange("chroma_format_idc is out of range [0, 3]: 4".into())
        );
    }
}
