//! Shared helpers for unit tests.

/// Parses and validates WGSL with the naga version wgpu compiles it with.
pub(crate) fn validate_wgsl(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{label} shader failed to parse:\n{}", e.emit_to_string(source)));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("{label} shader failed validation: {e:?}"));
}
