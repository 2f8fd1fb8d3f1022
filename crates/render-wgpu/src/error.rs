use modelview_render::GpuError;

/// Errors while bringing the GPU up. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported texture formats")]
    UnsupportedSurface,
}

/// Runs `f` inside a validation error scope and reports any error raised
/// by it against the caller's source location.
#[track_caller]
pub fn checked<T>(
    device: &wgpu::Device,
    call: &'static str,
    f: impl FnOnce() -> T,
) -> Result<T, GpuError> {
    let caller = std::panic::Location::caller();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(value),
        Some(error) => Err(GpuError::Api {
            call,
            file: caller.file(),
            line: caller.line(),
            message: error.to_string(),
        }),
    }
}
