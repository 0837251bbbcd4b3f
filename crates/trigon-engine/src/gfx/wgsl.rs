use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderError, ShaderStage};

/// Parses and validates one WGSL stage.
///
/// Returns the name of the entry point for `stage`. Errors carry naga's
/// rendered diagnostic (with source spans) as the compile log.
pub(crate) fn check_stage(stage: ShaderStage, source: &str) -> Result<String, ShaderError> {
    let compile_error = |log: String| ShaderError::Compile { stage, log };

    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| compile_error(e.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| compile_error(e.emit_to_string(source)))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| compile_error(format!("no @{stage} entry point in source")))
}
