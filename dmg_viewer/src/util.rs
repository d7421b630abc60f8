use std::collections::vec_deque::Iter;
use std::collections::VecDeque;

use dmg_ppu::common::image::Image;
use dmg_ppu::common::image::Rgba32;
use image::RgbaImage;

#[derive(Clone)]
pub struct RingBuffer<T, const N: usize> {
    pub stack: VecDeque<T>,
}

impl<T, const N: usize> RingBuffer<T, N> {
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, data: T) {
        self.stack.push_front(data);
        self.stack.truncate(N);
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.stack.iter()
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self {
            stack: Default::default(),
        }
    }
}

/// Lets the PPU render straight into an image::RgbaImage.
pub struct RgbaImageImpl {
    pub inner: RgbaImage,
}

impl Image for RgbaImageImpl {
    fn new(width: u32, height: u32) -> Self {
        RgbaImageImpl {
            inner: RgbaImage::new(width, height),
        }
    }

    fn set_pixel(&mut self, index: (u32, u32), value: Rgba32) {
        self.inner.put_pixel(index.0, index.1, image::Rgba(value.0));
    }
}
