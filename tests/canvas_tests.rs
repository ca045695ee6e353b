use cinematic::core::{rgba_len, Canvas, DrawOp, Rgba8};
use cinematic::texture::{generate_dashboard, gridline_alpha, layout_bars, DASHBOARD_HEIGHT, DASHBOARD_WIDTH};
use rand::rngs::StdRng;
use rand::SeedableRng;

const BACKGROUND: [u8; 4] = [0x0e, 0x15, 0x20, 0xff];

#[cfg(test)]
mod canvas_tests {
    use super::*;

    #[test]
    fn test_ops_run_in_order() {
        let canvas = Canvas::new(8, 8)
            .draw(DrawOp::Rect { x: 0, y: 0, width: 8, height: 8, color: Rgba8::opaque(255, 0, 0) })
            .draw(DrawOp::Fill(Rgba8::opaque(0, 0, 255)))
            .execute_ops();
        assert_eq!(canvas.pixel(4, 4), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_ops_are_pending_until_executed() {
        let canvas = Canvas::new(4, 4).draw(DrawOp::Fill(Rgba8::opaque(1, 2, 3)));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.execute_ops().pixel(0, 0), Some([1, 2, 3, 255]));
    }

    #[test]
    fn test_out_of_bounds_pixel() {
        assert_eq!(Canvas::new(4, 4).pixel(4, 0), None);
    }

    #[test]
    fn test_wrapping_existing_buffer() {
        let canvas = Canvas::from_rgba(2, 1, vec![9, 9, 9, 255, 1, 1, 1, 255]).unwrap();
        assert_eq!(canvas.pixel(1, 0), Some([1, 1, 1, 255]));
        assert!(Canvas::from_rgba(2, 2, vec![0; 4]).is_none());
    }
}

#[cfg(test)]
mod buffer_size_tests {
    use super::*;

    #[test]
    fn test_rgba_len_counts_bytes() {
        assert_eq!(rgba_len(2, 3), Some(24));
        assert_eq!(rgba_len(0, 100), Some(0));
        // 70_000 x 70_000 overflows a u32 byte count but not usize on 64-bit
        if cfg!(target_pointer_width = "64") {
            assert_eq!(rgba_len(70_000, 70_000), Some(19_600_000_000));
        }
        assert_eq!(rgba_len(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_huge_buffers_are_rejected_without_panicking() {
        assert!(Canvas::from_rgba(u32::MAX, u32::MAX, Vec::new()).is_none());
        assert!(Canvas::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Canvas::from_rgba(2, 2, vec![0; 16]).is_some());
        assert_eq!(Canvas::new(u32::MAX, u32::MAX).dimensions(), (0, 0));
    }
}

#[cfg(test)]
mod dashboard_tests {
    use super::*;

    fn dashboard(seed: u64) -> cinematic::texture::Texture {
        generate_dashboard(DASHBOARD_WIDTH, DASHBOARD_HEIGHT, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_dashboard_size() {
        let texture = dashboard(3);
        assert_eq!(texture.width(), 1024);
        assert_eq!(texture.height(), 512);
        assert_eq!(texture.pixels().len(), 1024 * 512 * 4);
    }

    #[test]
    fn test_background_fill() {
        let texture = dashboard(3);
        assert_eq!(texture.texel(5, 5), BACKGROUND);
        assert_eq!(texture.texel(1020, 505), BACKGROUND);
    }

    #[test]
    fn test_gridline_lightens_background() {
        let texture = dashboard(3);
        let line = texture.texel(5, 60);
        let between = texture.texel(5, 61);
        assert_eq!(between, BACKGROUND);
        assert!(line[0] > BACKGROUND[0] && line[1] > BACKGROUND[1] && line[2] > BACKGROUND[2]);
    }

    #[test]
    fn test_gridlines_fade_towards_bottom() {
        assert!((gridline_alpha(0, 512) - 0.06).abs() < 1e-6);
        assert!((gridline_alpha(512, 512) - 0.02).abs() < 1e-6);
        assert!(gridline_alpha(100, 512) > gridline_alpha(400, 512));
    }

    #[test]
    fn test_first_bar_is_green() {
        let texture = dashboard(3);
        // Just above the common baseline, below the last gridline
        let [r, g, b, a] = texture.texel(50, 490);
        assert_eq!(a, 255);
        assert!(g > r && g > b, "expected green, got {:?}", [r, g, b]);
    }

    #[test]
    fn test_bars_differ_between_textures() {
        let a = layout_bars(1024, 512, &mut StdRng::seed_from_u64(10));
        let b = layout_bars(1024, 512, &mut StdRng::seed_from_u64(11));
        assert_ne!(
            a.iter().map(|bar| bar.height).collect::<Vec<_>>(),
            b.iter().map(|bar| bar.height).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_same_seed_same_texture() {
        assert_eq!(dashboard(5).pixels(), dashboard(5).pixels());
    }
}
