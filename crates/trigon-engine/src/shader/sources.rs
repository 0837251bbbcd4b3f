//! Built-in WGSL stages.

use crate::paint::Color;

/// Passes the xyz position through unchanged (w = 1).
pub const DEFAULT_VERTEX: &str = "\
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position.x, position.y, position.z, 1.0);
}
";

/// Fragment stage that writes `color` to every covered pixel.
///
/// Channels are clamped to `[0, 1]`. NaN and infinities have no WGSL literal,
/// so a color carrying one is replaced by opaque black.
pub fn solid_fragment(color: Color) -> String {
    let color = if color.is_finite() {
        color
    } else {
        log::warn!("non-finite fragment color {color:?}, drawing black instead");
        Color::BLACK
    };
    let Color { r, g, b, a } = color.clamped();
    format!(
        "\
@fragment
fn fs_main() -> @location(0) vec4<f32> {{
    return vec4<f32>({r:?}, {g:?}, {b:?}, {a:?});
}}
"
    )
}
