//! Bar-chart rendering of analyser bytes.

use super::canvas::{hsl_to_rgba, Canvas, Rgba};

/// Hue (degrees) of the frequency bar for `index` out of `bin_count` bins
pub fn hue_for_bin(index: usize, bin_count: usize) -> f32 {
    index as f32 / bin_count as f32 * 360.0
}

/// Draw frequency bars and time-domain marks across the whole canvas.
///
/// Each byte maps to a height of `H * value / 256` measured up from one
/// pixel above the bottom edge. Frequency bars are coloured along the hue
/// circle; time-domain samples are small gray marks.
pub fn draw_spectrum(canvas: &mut Canvas, frequencies: &[u8], time_domain: &[u8]) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;

    let bin_count = frequencies.len();
    if bin_count > 0 {
        let bar_width = width / bin_count as f32;
        for (i, value) in frequencies.iter().enumerate() {
            let bar_height = height * (*value as f32 / 256.0);
            let offset = height - bar_height - 1.0;
            let color = hsl_to_rgba(hue_for_bin(i, bin_count), 1.0, 0.5);
            canvas.fill_rect(i as f32 * bar_width, offset, bar_width, bar_height, color);
        }
    }

    let sample_count = time_domain.len();
    if sample_count > 0 {
        let bar_width = width / sample_count as f32;
        for (i, value) in time_domain.iter().enumerate() {
            let mark_height = height * (*value as f32 / 256.0);
            let offset = height - mark_height - 1.0;
            canvas.fill_rect(i as f32 * bar_width, offset, 1.0, 2.0, Rgba::GRAY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_endpoints() {
        assert_eq!(hue_for_bin(0, 1024), 0.0);
        assert_eq!(hue_for_bin(512, 1024), 180.0);

        let last = hue_for_bin(1023, 1024);
        assert!(last < 360.0);
        assert!(360.0 - last < 0.5);
    }

    #[test]
    fn test_full_scale_bar_reaches_top() {
        let mut canvas = Canvas::new(8, 100, Rgba::BLACK);
        let mut freqs = vec![0u8; 8];
        freqs[0] = 255;
        draw_spectrum(&mut canvas, &freqs, &[]);

        let red = hsl_to_rgba(0.0, 1.0, 0.5);
        // 100 * 255/256 = 99.6 px tall, top at ~-0.6
        assert_eq!(canvas.pixel(0, 0), Some(red));
        assert_eq!(canvas.pixel(0, 98), Some(red));
        assert_eq!(canvas.pixel(1, 50), Some(Rgba::BLACK));
    }

    #[test]
    fn test_zero_bars_leave_background() {
        let mut canvas = Canvas::new(16, 16, Rgba::BLACK);
        draw_spectrum(&mut canvas, &[0; 16], &[]);
        assert!(canvas.as_bytes().chunks(4).all(|p| p[..3] == [0, 0, 0]));
    }

    #[test]
    fn test_time_domain_midline_marks() {
        let mut canvas = Canvas::new(4, 256, Rgba::BLACK);
        draw_spectrum(&mut canvas, &[], &[128; 4]);

        // 256 * 128/256 = 128 px, offset = 256 - 128 - 1 = 127
        for x in 0..4 {
            assert_eq!(canvas.pixel(x, 127), Some(Rgba::GRAY));
            assert_eq!(canvas.pixel(x, 128), Some(Rgba::GRAY));
            assert_eq!(canvas.pixel(x, 129), Some(Rgba::BLACK));
        }
    }
}
