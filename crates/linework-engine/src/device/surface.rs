use super::PresentOutcome;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Highest multisample count any wgpu texture format reports.
const MAX_SAMPLE_COUNT: u32 = 16;

/// Picks the largest supported sample count not above `requested`.
///
/// Candidates are powers of two up to `MAX_SAMPLE_COUNT`; 1 is always
/// accepted.
pub(crate) fn choose_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    let requested = requested.clamp(1, MAX_SAMPLE_COUNT);
    let mut count = requested.next_power_of_two();
    if count > requested {
        count /= 2;
    }
    while count > 1 {
        if supported(count) {
            return count;
        }
        count /= 2;
    }
    1
}

/// What to do after `get_current_texture` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SurfaceRecovery {
    /// Reconfigure the surface, then skip this frame.
    Reconfigure,
    /// Skip this frame and try again next time.
    Skip,
    /// Give up.
    Fatal,
}

impl SurfaceRecovery {
    pub(crate) fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
            wgpu::SurfaceError::OutOfMemory => SurfaceRecovery::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceRecovery::Skip,
        }
    }

    pub(crate) fn outcome(self) -> PresentOutcome {
        match self {
            SurfaceRecovery::Reconfigure | SurfaceRecovery::Skip => PresentOutcome::Skipped,
            SurfaceRecovery::Fatal => PresentOutcome::Fatal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_keeps_supported_request() {
        assert_eq!(choose_sample_count(4, |n| n == 4 || n == 2), 4);
    }

    #[test]
    fn sample_count_falls_back_to_lower_power_of_two() {
        assert_eq!(choose_sample_count(4, |n| n == 2), 2);
        assert_eq!(choose_sample_count(4, |_| false), 1);
    }

    #[test]
    fn sample_count_rounds_odd_requests_down() {
        assert_eq!(choose_sample_count(6, |_| true), 4);
        assert_eq!(choose_sample_count(0, |_| true), 1);
    }

    #[test]
    fn oversized_requests_are_clamped() {
        assert_eq!(choose_sample_count(u32::MAX, |n| n == 4), 4);
        assert_eq!(choose_sample_count(1 << 31, |_| true), MAX_SAMPLE_COUNT);
    }

    #[test]
    fn surface_errors_map_to_outcomes() {
        use wgpu::SurfaceError;

        assert_eq!(SurfaceRecovery::classify(&SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(SurfaceRecovery::classify(&SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
        assert_eq!(SurfaceRecovery::classify(&SurfaceError::Timeout), SurfaceRecovery::Skip);
        assert_eq!(SurfaceRecovery::classify(&SurfaceError::OutOfMemory), SurfaceRecovery::Fatal);

        assert_eq!(SurfaceRecovery::Reconfigure.outcome(), PresentOutcome::Skipped);
        assert_eq!(SurfaceRecovery::Fatal.outcome(), PresentOutcome::Fatal);
    }
}
