use motio_image::ImageError;

/// Create a sobel kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, 3 or 5.
///
/// # Returns
///
/// A tuple with the derivative kernel and the smoothing kernel.
///
/// # Errors
///
/// Returns [`ImageError::InvalidKernelSize`] for any other size.
pub fn sobel_kernel_1d(kernel_size: usize) -> Result<(Vec<f32>, Vec<f32>), ImageError> {
    let (derivative, smoothing) = match kernel_size {
        3 => (vec![-1.0, 0.0, 1.0], vec![1.0, 2.0, 1.0]),
        5 => (
            vec![-1.0, -2.0, 0.0, 2.0, 1.0],
            vec![1.0, 4.0, 6.0, 4.0, 1.0],
        ),
        _ => return Err(ImageError::InvalidKernelSize(kernel_size)),
    };
    Ok((derivative, smoothing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sobel_kernel_1d() -> Result<(), ImageError> {
        let kernel = sobel_kernel_1d(3)?;
        assert_eq!(kernel.0, vec![-1.0, 0.0, 1.0]);
        assert_eq!(kernel.1, vec![1.0, 2.0, 1.0]);

        let kernel = sobel_kernel_1d(5)?;
        assert_eq!(kernel.0, vec![-1.0, -2.0, 0.0, 2.0, 1.0]);
        assert_eq!(kernel.1, vec![1.0, 4.0, 6.0, 4.0, 1.0]);

        assert_eq!(sobel_kernel_1d(4), Err(ImageError::InvalidKernelSize(4)));
        Ok(())
    }
}
