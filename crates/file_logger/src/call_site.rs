use std::panic::Location;
use std::path::Path;

/// Where a log call was made.
///
/// The façade resolves this through a chain of `#[track_caller]` functions,
/// so every function between the user's call and [`CallSite::resolve`] must
/// carry that attribute. Dropping it from one wrapper makes the reported
/// file and line point into this crate instead of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallSite {
    pub function: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub fn new(function: &'static str,
               file: &'static str,
               line: u32
    ) -> Self {
        CallSite {
            function: trim_function_name(function),
            file: short_file_name(file),
            line,
        }
    }

    /// Site of the outermost `#[track_caller]` frame. The function name is
    /// not available this way and is left empty.
    #[track_caller]
    pub fn resolve() -> Self {
        let location = Location::caller();
        CallSite {
            function: "",
            file: short_file_name(location.file()),
            line: location.line(),
        }
    }
}

pub fn short_file_name(path: &'static str) -> &'static str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Strips the helper item and closure markers that `function_name!` leaves
/// on a type name.
pub fn trim_function_name(mut name: &'static str) -> &'static str {
    if let Some(stripped) = name.strip_suffix("::__file_logger_site") {
        name = stripped;
    }
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    name
}

/// Path of the enclosing function, e.g. `my_app::server::run`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __file_logger_site() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::call_site::trim_function_name(type_name_of(__file_logger_site))
    }};
}

/// Captures the enclosing function, file and line.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new($crate::function_name!(), file!(), line!())
    };
}
