//! Grid opacity as a function of page scroll.
//!
//! The page starts on a 0.6 plateau, fades out shortly after the first
//! viewport, stays hidden through the middle of the document and fades back in
//! to 0.3 near the bottom. The end plateau being half the start plateau is
//! kept as authored; it has not been confirmed as intended.

pub const START_OPACITY: f32 = 0.6;
pub const END_OPACITY: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeRegions {
    pub fade_out_start: f32,
    pub fade_out_duration: f32,
    pub fade_in_start: f32,
    pub fade_in_duration: f32,
}

impl FadeRegions {
    pub fn new(viewport_height: f32, document_height: f32) -> Self {
        let max_scroll = document_height - viewport_height;
        Self {
            fade_out_start: viewport_height * 1.3,
            fade_out_duration: viewport_height * 0.375,
            fade_in_start: max_scroll - viewport_height * 0.5,
            fade_in_duration: viewport_height * 0.375,
        }
    }

    pub fn opacity(&self, scroll_y: f32) -> f32 {
        let out_end = self.fade_out_start + self.fade_out_duration;
        let in_end = self.fade_in_start + self.fade_in_duration;

        let o = if scroll_y < self.fade_out_start {
            START_OPACITY
        } else if scroll_y < out_end {
            if self.fade_out_duration <= 0.0 {
                0.0
            } else {
                let p = (scroll_y - self.fade_out_start) / self.fade_out_duration;
                START_OPACITY * (1.0 - p)
            }
        } else if scroll_y < self.fade_in_start {
            0.0
        } else if scroll_y < in_end {
            if self.fade_in_duration <= 0.0 {
                END_OPACITY
            } else {
                let p = (scroll_y - self.fade_in_start) / self.fade_in_duration;
                END_OPACITY * p
            }
        } else {
            END_OPACITY
        };
        o.clamp(0.0, START_OPACITY)
    }
}

pub fn opacity(scroll_y: f32, viewport_height: f32, document_height: f32) -> f32 {
    FadeRegions::new(viewport_height, document_height).opacity(scroll_y)
}
