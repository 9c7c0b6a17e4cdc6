/// C, C++, Objective-C and Objective-C++ sources and headers.
pub const C_FAMILY_EXTENSIONS: &[&str] = &[".m", ".mm", ".c", ".cc", ".cpp", ".h", ".hpp"];

pub fn is_c_family(path: &str) -> bool {
    C_FAMILY_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Keeps the C-family paths, in input order.
pub fn filter_c_family<S: AsRef<str>>(files: &[S]) -> Vec<String> {
    files
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| is_c_family(f))
        .map(str::to_string)
        .collect()
}
