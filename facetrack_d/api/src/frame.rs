use image::RgbaImage;

pub const FRAME_WIDTH: u32 = 1280;
pub const FRAME_HEIGHT: u32 = 720;

/// Off-screen RGBA surface that each tick draws the camera frame into.
#[derive(Debug, Clone)]
pub struct RasterFrame {
    image: RgbaImage,
}

impl RasterFrame {
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(FRAME_WIDTH, FRAME_HEIGHT),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }
}

impl Default for RasterFrame {
    fn default() -> Self {
        Self::new()
    }
}
