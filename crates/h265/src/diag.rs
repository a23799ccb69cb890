/// Reports a condition that is about to fail the parse.
///
/// Forwards to `log::error!` when the `diagnostics` feature is enabled and
/// compiles to nothing otherwise; parse results are identical either way.
#[cfg(feature = "diagnostics")]
macro_rules! diag_error {
    ($($arg:tt)*) => {
        ::log::error!($($arg)*)
    };
}

#[cfg(not(feature = "diagnostics"))]
macro_rules! diag_error {
    ($($arg:tt)*) => {{
        let _ = ::std::format_args!($($arg)*);
    }};
}

pub(crate) use diag_error;
