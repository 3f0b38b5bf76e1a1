#[cfg(not(feature = "debug_log"))]
macro_rules! debug_log {
    ($depth:expr, $($arg:tt)*) => {};
}

#[cfg(feature = "debug_log")]
macro_rules! debug_log {
    ($depth:expr, $($arg:tt)*) => {
        log::trace!(
            target: "certstatus_asn1_der",
            "{:indent$}{}",
            "",
            format_args!($($arg)*),
            indent = $depth * 2
        )
    };
}
