use image::RgbaImage;
use xcap::Monitor;

use crate::error::CaptureError;
use crate::monitor::FrameSource;

/// One full-screen raster. Frames are scoped to a single detection cycle
/// and never persisted.
pub type Frame = RgbaImage;

/// Screen capture source backed by `xcap`.
///
/// The monitor handle is resolved once at startup and reused for every
/// capture. Capture itself can still fail per cycle (display disconnected,
/// permission revoked); the monitor loop treats that as a skipped cycle.
pub struct ScreenSource {
    monitor: Monitor,
}

impl ScreenSource {
    /// Resolve the display to watch.
    ///
    /// `index` selects a specific display; `None` picks the primary one
    /// (falling back to the first display when none is marked primary).
    pub fn new(index: Option<usize>) -> Result<Self, CaptureError> {
        let mut monitors = Monitor::all().map_err(|e| CaptureError::InitFailed(Box::new(e)))?;
        if monitors.is_empty() {
            return Err(CaptureError::NoDisplays);
        }

        let monitor = match index {
            Some(i) => {
                if i >= monitors.len() {
                    return Err(CaptureError::InvalidDisplayIndex(i));
                }
                monitors.swap_remove(i)
            }
            None => {
                let primary = monitors
                    .iter()
                    .position(|m| m.is_primary().unwrap_or(false))
                    .unwrap_or(0);
                monitors.swap_remove(primary)
            }
        };

        if let Ok(name) = monitor.name() {
            tracing::info!("capturing display: {name}");
        }

        Ok(Self { monitor })
    }
}

impl FrameSource for ScreenSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.monitor
            .capture_image()
            .map_err(|e| CaptureError::CaptureFailed(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_index() {
        // Only meaningful where a display server is present; without one the
        // enumeration itself fails, which is also an acceptable outcome.
        match ScreenSource::new(Some(usize::MAX)) {
            Err(CaptureError::InvalidDisplayIndex(i)) => assert_eq!(i, usize::MAX),
            Err(_) => {}
            Ok(_) => panic!("index way past any real display count"),
        }
    }
}
