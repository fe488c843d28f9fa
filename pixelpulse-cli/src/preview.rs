use image::{
    GrayImage,
    Rgb,
    RgbImage,
};

/// Spacing of the grid lines in pixels.
pub const GRID_SPACING: u32 = 50;

const GRID_COLOR: [u8; 3] = [50, 50, 50];
const GRID_ALPHA: f32 = 100.0 / 255.0;
const LINE_MARKER_COLOR: [u8; 3] = [255, 255, 0];
const LINE_MARKER_ALPHA: f32 = 150.0 / 255.0;

/// Renders the decoded image in color with an optional grid and a marker at
/// the line the decoder stopped at.
pub fn render_preview(image: &GrayImage, show_grid: bool, current_line: Option<u32>) -> RgbImage {
    let mut preview = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y).0[0];
        Rgb([value; 3])
    });

    if show_grid {
        for (x, y, pixel) in preview.enumerate_pixels_mut() {
            if x % GRID_SPACING == 0 || y % GRID_SPACING == 0 {
                blend(pixel, GRID_COLOR, GRID_ALPHA);
            }
        }
    }

    if let Some(line) = current_line.filter(|line| *line > 0 && *line < image.height()) {
        for x in 0..preview.width() {
            blend(preview.get_pixel_mut(x, line), LINE_MARKER_COLOR, LINE_MARKER_ALPHA);
        }
    }

    preview
}

fn blend(pixel: &mut Rgb<u8>, color: [u8; 3], alpha: f32) {
    for (channel, color) in pixel.0.iter_mut().zip(color) {
        let mixed = f32::from(*channel) * (1.0 - alpha) + f32::from(color) * alpha;
        *channel = mixed.round() as u8;
    }
}
