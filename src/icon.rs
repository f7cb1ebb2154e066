use image::{Rgba, RgbaImage};

const SIZE: u32 = 64;

/// A sun over a sky-blue tile, drawn at startup so no image asset ships.
pub fn render_icon() -> RgbaImage {
    let center = (SIZE as f32 - 1.0) / 2.0;
    let sun_radius = SIZE as f32 * 0.28;

    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        let angle = dy.atan2(dx);

        if dist <= sun_radius {
            Rgba([255, 214, 10, 255])
        } else if dist <= sun_radius * 1.6 && (angle * 4.0).sin().abs() > 0.85 {
            // eight rays
            Rgba([255, 190, 0, 255])
        } else {
            Rgba([135, 206, 250, 255])
        }
    })
}

pub fn icon_data() -> eframe::IconData {
    let image = render_icon();
    let (width, height) = image.dimensions();
    eframe::IconData {
        rgba: image.into_raw(),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_is_square_rgba() {
        let icon = icon_data();
        assert_eq!((icon.width, icon.height), (SIZE, SIZE));
        assert_eq!(icon.rgba.len(), (SIZE * SIZE * 4) as usize);
    }

    #[test]
    fn center_is_sun_and_corner_is_sky() {
        let image = render_icon();
        assert_eq!(image.get_pixel(SIZE / 2, SIZE / 2), &Rgba([255, 214, 10, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([135, 206, 250, 255]));
    }
}
