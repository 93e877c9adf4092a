/// Checks that a numerical value lies in the interval `[a,b]`, returning
/// [`Error::OutOfRange`](crate::Error::OutOfRange) from the enclosing function if not
///
/// A fourth argument of `open` makes the upper bound exclusive, i.e. `[a,b)`.
///
/// ### Example
/// ```ignore
/// ensure_interval!(config.lrate, 0.0, 1.0);
/// ```
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::Error::OutOfRange {
                name: $crate::util::field_name(stringify!($var)),
                value: $var,
                interval: concat!("[", stringify!($a), ", ", stringify!($b), "]"),
            });
        }
    };
    ($var:expr, $a:expr, $b:expr, open) => {
        if !($var >= $a && $var < $b) {
            return Err($crate::Error::OutOfRange {
                name: $crate::util::field_name(stringify!($var)),
                value: $var,
                interval: concat!("[", stringify!($a), ", ", stringify!($b), ")"),
            });
        }
    };
}

pub(crate) use ensure_interval;

/// Strips any leading path off a stringified expression, so `config.lrate` reports as `lrate`
pub(crate) fn field_name(expr: &'static str) -> &'static str {
    expr.rsplit('.').next().unwrap_or(expr).trim()
}
