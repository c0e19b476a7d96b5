//! Fallible allocation of per-frame working buffers.

use image::{ImageBuffer, Luma, Primitive};

use crate::error::CannyError;

/// Allocates a buffer of `len` copies of `value`, reporting allocation failure instead of aborting.
pub(crate) fn filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, CannyError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CannyError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, value);
    Ok(buf)
}

/// Appends `value`, reporting allocation failure when the buffer has to grow.
pub(crate) fn try_push<T>(buf: &mut Vec<T>, value: T) -> Result<(), CannyError> {
    buf.try_reserve(1).map_err(|_| CannyError::Allocation {
        bytes: buf
            .len()
            .saturating_add(1)
            .saturating_mul(std::mem::size_of::<T>()),
    })?;
    buf.push(value);
    Ok(())
}

/// Number of pixels in a `width` x `height` grid, rejecting sizes that overflow `usize`.
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize, CannyError> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(CannyError::Allocation { bytes: usize::MAX })
}

/// Wraps a row-major buffer as a single-channel image of the given size.
pub(crate) fn into_luma<T: Primitive>(
    width: u32,
    height: u32,
    data: Vec<T>,
) -> Result<ImageBuffer<Luma<T>, Vec<T>>, CannyError> {
    let actual = data.len();
    ImageBuffer::from_raw(width, height, data).ok_or(CannyError::BufferSize {
        width,
        height,
        expected: width as usize * height as usize,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_buffer_has_requested_length() {
        let buf = filled(12, 0.5f32).unwrap();
        assert_eq!(buf.len(), 12);
        assert!(buf.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn try_push_grows_in_order() {
        let mut stack = Vec::new();
        for i in 0..100usize {
            try_push(&mut stack, i).unwrap();
        }
        assert_eq!(stack, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn impossible_allocation_is_an_error() {
        let err = filled(usize::MAX / 2, 0u64).unwrap_err();
        assert!(matches!(err, CannyError::Allocation { .. }));
    }
}
