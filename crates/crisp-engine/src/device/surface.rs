use crate::coords::PixelSize;

use super::GpuInit;

/// What the frame loop should do after a failed surface acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Skip this frame and try again.
    SkipFrame,
    /// Unrecoverable; the runtime should exit.
    Fatal,
}

/// Maps an acquire error to an action.
///
/// A lost or outdated surface can only be reconfigured at a non-zero size;
/// while minimized it is skipped until the next resize.
pub(crate) fn error_action(err: &wgpu::SurfaceError, size: PixelSize) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated if size.is_valid() => {
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;
    if prefer_srgb {
        let srgb = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = srgb.into_iter().find(|f| caps.formats.contains(f)) {
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

/// Surface configuration for `size`, or `None` when the surface offers no
/// format at all.
///
/// The canvas texture is created with the chosen format, so this decides the
/// color space sprites are blended in.
pub(crate) fn surface_config(
    caps: &wgpu::SurfaceCapabilities,
    init: &GpuInit,
    size: PixelSize,
) -> Option<wgpu::SurfaceConfiguration> {
    let format = choose_surface_format(caps, init.prefer_srgb)?;
    Some(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: init.present_mode,
        alpha_mode: choose_alpha_mode(caps, init.alpha_mode),
        view_formats: vec![],
        desired_maximum_frame_latency: init.frame_latency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_preferred_when_offered() {
        let c = caps(vec![
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ]);
        assert_eq!(
            choose_surface_format(&c, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&c, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(choose_surface_format(&caps(vec![]), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8UnormSrgb]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn config_follows_init_and_clamps_zero_size() {
        let c = caps(vec![wgpu::TextureFormat::Rgba8UnormSrgb]);
        let init = GpuInit {
            present_mode: wgpu::PresentMode::Mailbox,
            frame_latency: 3,
            ..GpuInit::default()
        };
        let cfg = surface_config(&c, &init, PixelSize::new(0, 480)).unwrap();
        assert_eq!(cfg.format, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!((cfg.width, cfg.height), (1, 480));
        assert_eq!(cfg.present_mode, wgpu::PresentMode::Mailbox);
        assert_eq!(cfg.desired_maximum_frame_latency, 3);
        assert!(surface_config(&caps(vec![]), &init, PixelSize::new(640, 480)).is_none());
    }

    #[test]
    fn lost_surface_waits_for_a_visible_size() {
        let visible = PixelSize::new(640, 480);
        let minimized = PixelSize::new(0, 0);
        assert_eq!(error_action(&wgpu::SurfaceError::Lost, visible), SurfaceErrorAction::Reconfigured);
        assert_eq!(error_action(&wgpu::SurfaceError::Outdated, minimized), SurfaceErrorAction::SkipFrame);
        assert_eq!(error_action(&wgpu::SurfaceError::OutOfMemory, visible), SurfaceErrorAction::Fatal);
        assert_eq!(error_action(&wgpu::SurfaceError::Timeout, visible), SurfaceErrorAction::SkipFrame);
    }
}
