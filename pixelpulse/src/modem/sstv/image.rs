use image::{
    GrayImage,
    Luma,
    RgbImage,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Y,
    U,
    V,
}

/// BT.601 RGB to YUV, with chroma centered at 128.
#[inline]
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> [f32; 3] {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = 0.492 * (b - y) + 128.0;
    let v = 0.877 * (r - y) + 128.0;
    [y, u, v]
}

/// Source of per-channel pixel intensities for the encoder.
pub trait FrameBuffer {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn channel(&self, x: usize, y: usize, channel: Channel) -> f32;

    fn row(&self, y: usize, channel: Channel) -> Vec<f32> {
        (0..self.width()).map(|x| self.channel(x, y, channel)).collect()
    }
}

impl<F> FrameBuffer for &F
where
    F: FrameBuffer,
{
    #[inline]
    fn width(&self) -> usize {
        (&**self).width()
    }

    #[inline]
    fn height(&self) -> usize {
        (&**self).height()
    }

    #[inline]
    fn channel(&self, x: usize, y: usize, channel: Channel) -> f32 {
        (&**self).channel(x, y, channel)
    }

    #[inline]
    fn row(&self, y: usize, channel: Channel) -> Vec<f32> {
        (&**self).row(y, channel)
    }
}

/// A single channel of intensities in `[0, 255]`, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Plane {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

/// Luma and chroma planes of an image.
#[derive(Clone, Debug)]
pub struct YuvFrame {
    pub y: Plane,
    pub u: Plane,
    pub v: Plane,
}

impl YuvFrame {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut frame = Self {
            y: Plane::new(width, height),
            u: Plane::new(width, height),
            v: Plane::new(width, height),
        };

        for (x, y, pixel) in image.enumerate_pixels() {
            let [luma, u, v] = rgb_to_yuv(pixel.0[0], pixel.0[1], pixel.0[2]);
            let (x, y) = (x as usize, y as usize);
            frame.y.set(x, y, luma);
            frame.u.set(x, y, u);
            frame.v.set(x, y, v);
        }

        frame
    }

    #[inline]
    pub fn plane(&self, channel: Channel) -> &Plane {
        match channel {
            Channel::Y => &self.y,
            Channel::U => &self.u,
            Channel::V => &self.v,
        }
    }
}

impl FrameBuffer for YuvFrame {
    #[inline]
    fn width(&self) -> usize {
        self.y.width
    }

    #[inline]
    fn height(&self) -> usize {
        self.y.height
    }

    #[inline]
    fn channel(&self, x: usize, y: usize, channel: Channel) -> f32 {
        self.plane(channel).get(x, y)
    }

    #[inline]
    fn row(&self, y: usize, channel: Channel) -> Vec<f32> {
        self.plane(channel).row(y).to_vec()
    }
}

impl FrameBuffer for RgbImage {
    #[inline]
    fn width(&self) -> usize {
        RgbImage::width(self) as usize
    }

    #[inline]
    fn height(&self) -> usize {
        RgbImage::height(self) as usize
    }

    #[inline]
    fn channel(&self, x: usize, y: usize, channel: Channel) -> f32 {
        let pixel = self.get_pixel(x as u32, y as u32);
        let [luma, u, v] = rgb_to_yuv(pixel.0[0], pixel.0[1], pixel.0[2]);
        match channel {
            Channel::Y => luma,
            Channel::U => u,
            Channel::V => v,
        }
    }
}

/// Sink for decoded grayscale pixels. Writes outside of the buffer are
/// discarded.
pub trait FrameBufferMut {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_size(&mut self, width: usize, height: usize);
    fn set_gray(&mut self, x: usize, y: usize, value: u8);
}

impl<F> FrameBufferMut for &mut F
where
    F: FrameBufferMut,
{
    #[inline]
    fn width(&self) -> usize {
        (&**self).width()
    }

    #[inline]
    fn height(&self) -> usize {
        (&**self).height()
    }

    fn set_size(&mut self, width: usize, height: usize) {
        (&mut **self).set_size(width, height);
    }

    fn set_gray(&mut self, x: usize, y: usize, value: u8) {
        (&mut **self).set_gray(x, y, value);
    }
}

impl FrameBufferMut for GrayImage {
    #[inline]
    fn width(&self) -> usize {
        GrayImage::width(self) as usize
    }

    #[inline]
    fn height(&self) -> usize {
        GrayImage::height(self) as usize
    }

    /// Resizes and fills with white, the value for "nothing decoded here".
    fn set_size(&mut self, width: usize, height: usize) {
        *self = GrayImage::from_pixel(width as u32, height as u32, Luma([WHITE]));
    }

    fn set_gray(&mut self, x: usize, y: usize, value: u8) {
        if x < FrameBufferMut::width(self) && y < FrameBufferMut::height(self) {
            self.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }
}

pub const WHITE: u8 = 0xff;

/// Inclusive bounding box `(min_x, min_y, max_x, max_y)` of all pixels darker
/// than pure white.
pub fn crop_bounds(image: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[0] < WHITE {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
    }

    bounds
}

/// Crops `image` to [`crop_bounds`]. An image without non-white pixels is
/// returned unchanged.
pub fn auto_crop(image: &GrayImage) -> GrayImage {
    let Some((min_x, min_y, max_x, max_y)) = crop_bounds(image)
    else {
        tracing::debug!("nothing to crop");
        return image.clone();
    };

    tracing::debug!(min_x, min_y, max_x, max_y, "cropping");
    image::imageops::crop_imm(image, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
        .to_image()
}
