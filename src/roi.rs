//! Region-of-interest selection.
//!
//! The detector only ever sees a square capture region of the frame. Keeping the region fixed
//! (instead of tracking the hand) makes the per-frame label stream much more stable, at the
//! cost of requiring the user to hold their hand inside the marked box.

use crate::rect::Rect;

/// Horizontal placement of the capture region inside the frame.
///
/// The region is always centered vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Centered horizontally.
    #[default]
    Center,
    /// Anchored to the left frame edge, offset by the margin.
    Left,
    /// Anchored to the right frame edge, offset by the margin.
    Right,
}

/// Computes the square capture region for frames of arbitrary size.
#[derive(Debug, Clone, Copy)]
pub struct RoiSelector {
    side: u32,
    margin: u32,
    placement: Placement,
}

impl RoiSelector {
    pub const DEFAULT_SIDE: u32 = 320;
    pub const DEFAULT_MARGIN: u32 = 20;

    pub fn new(side: u32, margin: u32, placement: Placement) -> Self {
        Self {
            side,
            margin,
            placement,
        }
    }

    /// Computes the crop rectangle for a frame of the given size.
    ///
    /// The configured side length shrinks when the frame cannot fit it; the returned rectangle
    /// always lies inside the frame. A frame too small to fit any region at all yields an
    /// empty rectangle.
    pub fn select(&self, frame_width: u32, frame_height: u32) -> Rect {
        let side = self
            .side
            .min(frame_width.min(frame_height).saturating_sub(self.margin));
        if side == 0 {
            return Rect::from_top_left(0, 0, 0, 0);
        }

        let x = match self.placement {
            Placement::Center => (frame_width - side) / 2,
            Placement::Left => self.margin,
            Placement::Right => frame_width - self.margin - side,
        };
        let y = (frame_height - side) / 2;

        Rect::from_top_left(x as i32, y as i32, side, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_rect(width: u32, height: u32) -> Rect {
        Rect::from_top_left(0, 0, width, height)
    }

    #[test]
    fn test_center_placement() {
        let sel = RoiSelector::new(320, 20, Placement::Center);
        let roi = sel.select(640, 480);
        assert_eq!(roi, Rect::from_top_left(160, 80, 320, 320));
    }

    #[test]
    fn test_aligned_placements() {
        let sel = RoiSelector::new(320, 40, Placement::Left);
        assert_eq!(sel.select(1280, 720), Rect::from_top_left(40, 200, 320, 320));

        let sel = RoiSelector::new(320, 40, Placement::Right);
        assert_eq!(
            sel.select(1280, 720),
            Rect::from_top_left(1280 - 40 - 320, 200, 320, 320)
        );
    }

    #[test]
    fn test_shrinks_to_fit() {
        let sel = RoiSelector::new(600, 20, Placement::Center);
        let roi = sel.select(640, 480);
        assert_eq!(roi.width(), 460);
        assert_eq!(roi.height(), 460);
        assert!(frame_rect(640, 480).contains_rect(&roi));
    }

    #[test]
    fn test_never_out_of_bounds() {
        for placement in [Placement::Center, Placement::Left, Placement::Right] {
            let sel = RoiSelector::new(360, 40, placement);
            for (w, h) in [(1280, 720), (640, 480), (400, 300), (360, 360), (50, 400)] {
                let roi = sel.select(w, h);
                assert!(
                    frame_rect(w, h).contains_rect(&roi),
                    "{placement:?} {w}x{h} -> {roi:?}"
                );
            }
        }
    }

    #[test]
    fn test_degenerate_frame() {
        let sel = RoiSelector::new(320, 20, Placement::Right);
        assert!(sel.select(10, 10).is_empty());
        assert!(sel.select(0, 0).is_empty());
        assert!(sel.select(20, 480).is_empty());
    }
}
