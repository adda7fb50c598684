use std::path::Path;

use image::{Rgb, RgbImage};
use log::debug;

use crate::shade::scale::HeatScale;
use crate::HeatTileError;

/// Render the heat scale as an image.
///
/// Columns sweep the change from `-cap` on the left to `+cap` on the right, and each column is
/// shaded top to bottom with that change's gradient.
pub fn render_legend(
    scale: &HeatScale,
    width: u32,
    height: u32,
) -> Result<RgbImage, HeatTileError> {
    if width == 0 || height == 0 {
        return Err(HeatTileError::InvalidLegend);
    }

    let mut image = RgbImage::new(width, height);
    for x in 0..width {
        let change = -scale.cap + 2.0 * scale.cap * fraction(x, width);
        let gradient = scale.gradient_for_change(change);
        let top = gradient.top.to_rgb();
        let bottom = gradient.bottom.to_rgb();

        for y in 0..height {
            let t = fraction(y, height);
            image.put_pixel(x, y, Rgb(lerp(top, bottom, t)));
        }
    }

    Ok(image)
}

/// Render the heat scale legend and write it to `path` as PNG.
pub fn save_legend<P: AsRef<Path>>(
    scale: &HeatScale,
    path: P,
    width: u32,
    height: u32,
) -> Result<(), HeatTileError> {
    let path = path.as_ref();
    let image = render_legend(scale, width, height)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    debug!("wrote {width}x{height} legend to {}", path.display());
    Ok(())
}

/// Position of `index` within `len` samples, in `[0, 1]`.
fn fraction(index: u32, len: u32) -> f64 {
    if len <= 1 {
        0.5
    } else {
        f64::from(index) / f64::from(len - 1)
    }
}

fn lerp(from: [u8; 3], to: [u8; 3], t: f64) -> [u8; 3] {
    let mut out = [0; 3];
    for (channel, (a, b)) in out.iter_mut().zip(from.iter().zip(to.iter())) {
        let value = f64::from(*a) + (f64::from(*b) - f64::from(*a)) * t;
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;
    use crate::shade::color::Hsl;

    #[test]
    fn edges_use_extreme_gradients() {
        let scale = HeatScale::default();
        let legend = render_legend(&scale, 17, 4).unwrap();

        assert_eq!(legend.get_pixel(0, 0).0, Hsl::new(0.0, 70.0, 16.0).to_rgb());
        assert_eq!(legend.get_pixel(0, 3).0, Hsl::new(0.0, 70.0, 8.0).to_rgb());
        assert_eq!(legend.get_pixel(16, 0).0, Hsl::new(140.0, 70.0, 16.0).to_rgb());
        assert_eq!(legend.get_pixel(8, 0).0, Hsl::new(140.0, 70.0, 60.0).to_rgb());
        assert_eq!(legend.get_pixel(8, 3).0, Hsl::new(140.0, 70.0, 52.0).to_rgb());
    }

    #[test]
    fn single_pixel_is_neutral() {
        let legend = render_legend(&HeatScale::default(), 1, 1).unwrap();
        let [r, g, b] = legend.get_pixel(0, 0).0;
        let neutral = Hsl::new(140.0, 70.0, 60.0).to_rgb();
        let bottom = Hsl::new(140.0, 70.0, 52.0).to_rgb();
        for (i, channel) in [r, g, b].into_iter().enumerate() {
            assert!(channel <= neutral[i].max(bottom[i]) && channel >= neutral[i].min(bottom[i]));
        }
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(
            render_legend(&HeatScale::default(), 0, 10),
            Err(HeatTileError::InvalidLegend)
        ));
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legend.png");
        save_legend(&HeatScale::default(), &path, 32, 8).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (32, 8));
    }
}
