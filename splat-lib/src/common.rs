/// Degree-0 spherical harmonics basis constant.
pub const SH_C0: f32 = 0.28209479177387814;
/// Degree-1 basis constant, applied with alternating sign.
pub const SH_C1: f32 = 0.48860251190291987;
/// Degree-2 basis constants for the `xy`, `yz` and `xz` terms.
pub const SH_C2_XY: f32 = 1.0925484305920792;
/// Degree-2 constant for `z²` in `0.946z² - 0.315`, i.e. `0.315 * (2z² - x² - y²)` on the unit sphere.
pub const SH_C2_ZZ: f32 = 0.94617469575755997;
pub const SH_C2_ZZ_OFFSET: f32 = 0.31539156525252005;
/// Degree-2 constant for the `x² - y²` term.
pub const SH_C2_XX_YY: f32 = 0.54627421529603959;

/// Number of `f_rest_*` coefficients a file may carry (degree 3, three channels).
pub const MAX_REST_COEFFS: usize = 45;
/// Rest coefficients grouped into (r, g, b) triples for rendering.
pub const REST_TRIPLES: usize = 9;

/// Raw scale used when a file carries no `scale_*` property, before exponentiation.
pub const DEFAULT_LOG_SCALE: f32 = 0.01;
/// DC coefficients used when a file carries no color information at all.
pub const DIAGNOSTIC_DC: [f32; 3] = [0.5, 0.0, -0.5];

#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[inline]
pub fn inv_sigmoid(x: f32) -> f32 {
    (x / (1.0 - x)).ln()
}

/// Color channel in [0, 1] to its degree-0 SH coefficient.
#[inline]
pub fn channel_to_dc(c: f32) -> f32 {
    (c - 0.5) / SH_C0
}

/// Degree-0 SH coefficient to its display channel value.
#[inline]
pub fn dc_to_channel(dc: f32) -> f32 {
    0.5 + SH_C0 * dc
}

#[inline]
pub(crate) fn clamp_u8(x: f32) -> u8 {
    (x * 255.0).round().clamp(0.0, 255.0) as u8
}
