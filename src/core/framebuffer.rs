use crate::core::color::to_rgba8;
use nalgebra::Vector3;
use rayon::prelude::*;
use std::ops::Range;

/// Color and depth storage for one viewport.
///
/// Parallel writers never share a pixel: triangles are filled row by row through
/// [`FrameBuffer::par_rows_mut`], which hands each worker disjoint row slices.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    color_buffer: Vec<Vector3<f32>>,
    depth_buffer: Vec<f32>,
}

/// Mutable view of a single scanline.
pub struct FrameRow<'a> {
    pub y: usize,
    color: &'a mut [Vector3<f32>],
    depth: &'a mut [f32],
}

impl FrameRow<'_> {
    /// Depth test (less) and write. Returns true if the fragment was kept.
    #[inline]
    pub fn test_and_set(&mut self, x: usize, depth: f32, color: Vector3<f32>) -> bool {
        match self.depth.get_mut(x) {
            Some(current) if depth < *current => {
                *current = depth;
                self.color[x] = color;
                true
            }
            _ => false,
        }
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color_buffer: vec![Vector3::zeros(); size],
            depth_buffer: vec![f32::INFINITY; size],
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Resets every pixel to `color` and every depth to `depth`.
    pub fn clear(&mut self, color: Vector3<f32>, depth: f32) {
        self.color_buffer.par_iter_mut().for_each(|c| *c = color);
        self.depth_buffer.par_iter_mut().for_each(|d| *d = depth);
    }

    /// Parallel iterator over the rows in `rows` (clamped to the buffer height).
    pub fn par_rows_mut(
        &mut self,
        rows: Range<usize>,
    ) -> impl IndexedParallelIterator<Item = FrameRow<'_>> + '_ {
        let width = self.width;
        let start = rows.start.min(self.height);
        let end = rows.end.clamp(start, self.height);
        let span = start * width..end * width;

        self.color_buffer[span.clone()]
            .par_chunks_mut(width.max(1))
            .zip(self.depth_buffer[span].par_chunks_mut(width.max(1)))
            .enumerate()
            .map(move |(i, (color, depth))| FrameRow {
                y: start + i,
                color,
                depth,
            })
    }

    /// Single-pixel depth test and write, used by the line stepper.
    #[inline]
    pub fn plot(&mut self, x: usize, y: usize, depth: f32, color: Vector3<f32>) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.color_buffer[idx] = color;
            true
        } else {
            false
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        self.in_bounds(x, y)
            .then(|| self.color_buffer[self.index(x, y)])
    }

    pub fn get_depth(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| self.depth_buffer[self.index(x, y)])
    }

    /// Row-major RGBA8 copy of the color buffer, top row first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color_buffer
            .par_iter()
            .flat_map_iter(|c| to_rgba8(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_color_and_depth() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.plot(1, 1, 0.5, Vector3::new(1.0, 0.0, 0.0));
        fb.clear(Vector3::new(0.95, 0.95, 0.95), f32::INFINITY);

        assert_eq!(fb.get_pixel(1, 1), Some(Vector3::new(0.95, 0.95, 0.95)));
        assert_eq!(fb.get_depth(1, 1), Some(f32::INFINITY));
        assert_eq!(fb.get_pixel(4, 0), None);
    }

    #[test]
    fn plot_keeps_nearest_fragment() {
        let mut fb = FrameBuffer::new(2, 2);
        assert!(fb.plot(0, 0, 0.5, Vector3::x()));
        assert!(!fb.plot(0, 0, 0.7, Vector3::y()));
        assert!(fb.plot(0, 0, 0.2, Vector3::z()));
        assert_eq!(fb.get_pixel(0, 0), Some(Vector3::z()));
    }

    #[test]
    fn rows_cover_requested_range_only() {
        let mut fb = FrameBuffer::new(3, 5);
        let ys: Vec<usize> = fb.par_rows_mut(1..9).map(|row| row.y).collect();
        assert_eq!(ys, vec![1, 2, 3, 4]);

        fb.par_rows_mut(2..3).for_each(|mut row| {
            row.test_and_set(1, 0.1, Vector3::x());
        });
        assert_eq!(fb.get_pixel(1, 2), Some(Vector3::x()));
        assert_eq!(fb.get_pixel(1, 3), Some(Vector3::zeros()));
    }

    #[test]
    fn rgba_export_is_row_major() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.plot(1, 0, 0.0, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(fb.to_rgba8(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }
}
