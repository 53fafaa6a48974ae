/// Build a [`Fields`](crate::Fields) map from `key => value` pairs.
///
/// Values go through `serde_json::Value::from`.
///
/// ```rust
/// let fields = tierlog::fields! {
///     "user" => "ada",
///     "attempt" => 3,
/// };
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields["attempt"], 3);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::__private::Value::from($value),
            );
        )+
        fields
    }};
}

/// Build the argument slice taken by the logging calls.
///
/// ```rust
/// let logger = tierlog::Logger::new();
/// let port = 8080;
/// logger.infof("listening on %s:%d", tierlog::args!["0.0.0.0", port]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        &[] as &[&dyn ::std::fmt::Display]
    };
    ($($arg:expr),+ $(,)?) => {
        &[$(&$arg as &dyn ::std::fmt::Display),+]
    };
}
