//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the output height for a width-targeted resize.
///
/// The source aspect ratio is preserved and the height is rounded to the
/// nearest pixel, never below 1. Targets wider than the source upscale.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target_width` - Requested variant width in pixels
///
/// # Examples
/// ```
/// # use respimg::imaging::calculate_scaled_height;
/// // 4:3 source at 320 wide → 240 high
/// assert_eq!(calculate_scaled_height((2000, 1500), 320), 240);
/// ```
pub fn calculate_scaled_height(source: (u32, u32), target_width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return src_h.max(1);
    }
    let h = (target_width as f64 * src_h as f64 / src_w as f64).round() as u32;
    h.max(1)
}

/// Convert a byte count to kilobytes with three decimals (`12.345`).
///
/// Uses decimal kilobytes (1 KB = 1000 bytes).
pub fn bytes_to_kb(bytes: u64) -> String {
    format!("{:.3}", bytes as f64 / 1000.0)
}
