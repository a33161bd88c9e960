//! Logical-to-physical run mapping
//!
//! The graphics layer only ever asks for horizontal and vertical runs in
//! logical (rotated) coordinates. At 90° and 270° a logical horizontal run
//! is a physical vertical run and vice versa, so the mapper returns the
//! physical axis together with the transformed origin.

/// Quarter-turn display rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Any integer is accepted and reduced modulo 4
    pub const fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub const fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Whether logical width/height are swapped relative to the panel
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Physical buffer axis a run is drawn along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A run in physical buffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalRun {
    pub axis: Axis,
    pub x: i32,
    pub y: i32,
    pub len: i32,
}

/// Clip `start..start + len` to `0..limit`
///
/// Computed in `i64` so any `i32` inputs are safe.
fn clip_span(start: i32, len: i32, limit: i32) -> Option<(i32, i32)> {
    if len <= 0 {
        return None;
    }
    let first = i64::from(start).max(0);
    let end = (i64::from(start) + i64::from(len)).min(i64::from(limit));
    if first >= end {
        return None;
    }
    Some((first as i32, (end - first) as i32))
}

/// Logical (width, height) of a `width` x `height` panel under `rotation`
fn logical_size(rotation: Rotation, width: i32, height: i32) -> (i32, i32) {
    if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Map a logical horizontal run onto the panel
///
/// `width` and `height` are the physical panel dimensions. The run is
/// clipped to the logical area first; `None` when nothing is visible.
pub fn map_horizontal(
    rotation: Rotation,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    len: i32,
) -> Option<PhysicalRun> {
    let (logical_w, logical_h) = logical_size(rotation, width, height);
    if y < 0 || y >= logical_h {
        return None;
    }
    let (x, len) = clip_span(x, len, logical_w)?;

    let run = match rotation {
        Rotation::Deg0 => PhysicalRun { axis: Axis::Horizontal, x, y, len },
        Rotation::Deg90 => PhysicalRun {
            axis: Axis::Vertical,
            x: width - 1 - y,
            y: x,
            len,
        },
        Rotation::Deg180 => PhysicalRun {
            axis: Axis::Horizontal,
            x: width - 1 - x - (len - 1),
            y: height - 1 - y,
            len,
        },
        Rotation::Deg270 => PhysicalRun {
            axis: Axis::Vertical,
            x: y,
            y: height - 1 - x - (len - 1),
            len,
        },
    };
    Some(run)
}

/// Map a logical vertical run onto the panel
pub fn map_vertical(
    rotation: Rotation,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    len: i32,
) -> Option<PhysicalRun> {
    let (logical_w, logical_h) = logical_size(rotation, width, height);
    if x < 0 || x >= logical_w {
        return None;
    }
    let (y, len) = clip_span(y, len, logical_h)?;

    let run = match rotation {
        Rotation::Deg0 => PhysicalRun { axis: Axis::Vertical, x, y, len },
        Rotation::Deg90 => PhysicalRun {
            axis: Axis::Horizontal,
            x: width - 1 - y - (len - 1),
            y: x,
            len,
        },
        Rotation::Deg180 => PhysicalRun {
            axis: Axis::Vertical,
            x: width - 1 - x,
            y: height - 1 - y - (len - 1),
            len,
        },
        Rotation::Deg270 => PhysicalRun {
            axis: Axis::Horizontal,
            x: y,
            y: height - 1 - x,
            len,
        },
    };
    Some(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: i32 = 128;
    const H: i32 = 64;

    #[test]
    fn test_quarter_turns_wrap() {
        assert_eq!(Rotation::from_quarter_turns(0), Rotation::Deg0);
        assert_eq!(Rotation::from_quarter_turns(5), Rotation::Deg90);
        assert_eq!(Rotation::from_quarter_turns(-1), Rotation::Deg270);
        assert_eq!(Rotation::from_quarter_turns(2).quarter_turns(), 2);
        assert!(Rotation::Deg270.swaps_axes());
        assert!(!Rotation::Deg180.swaps_axes());
    }

    #[test]
    fn test_identity() {
        let run = map_horizontal(Rotation::Deg0, W, H, 3, 4, 10);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Horizontal, x: 3, y: 4, len: 10 }));
        let run = map_vertical(Rotation::Deg0, W, H, 3, 4, 10);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Vertical, x: 3, y: 4, len: 10 }));
    }

    #[test]
    fn test_quarter_turns_swap_primitive() {
        let run = map_horizontal(Rotation::Deg90, W, H, 0, 0, 5);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Vertical, x: W - 1, y: 0, len: 5 }));

        let run = map_vertical(Rotation::Deg90, W, H, 0, 0, 5);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Horizontal, x: W - 5, y: 0, len: 5 }));

        let run = map_horizontal(Rotation::Deg270, W, H, 0, 0, 5);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Vertical, x: 0, y: H - 5, len: 5 }));

        let run = map_vertical(Rotation::Deg270, W, H, 0, 0, 5);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Horizontal, x: 0, y: H - 1, len: 5 }));
    }

    #[test]
    fn test_half_turn_reflects_through_center() {
        let run = map_horizontal(Rotation::Deg180, W, H, 10, 20, 8);
        // logical x 10..=17 becomes physical 110..=117
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Horizontal, x: 110, y: 43, len: 8 }));

        let run = map_vertical(Rotation::Deg180, W, H, 10, 20, 8);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Vertical, x: 117, y: 36, len: 8 }));
    }

    #[test]
    fn test_runs_are_clipped_before_mapping() {
        // logical x -5..=4 on a 90° panel keeps 0..=4
        let run = map_horizontal(Rotation::Deg90, W, H, -5, 2, 10);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Vertical, x: W - 3, y: 0, len: 5 }));

        // 180°: logical 120..=135 keeps 120..=127, physical 0..=7
        let run = map_horizontal(Rotation::Deg180, W, H, 120, 0, 16);
        assert_eq!(run, Some(PhysicalRun { axis: Axis::Horizontal, x: 0, y: H - 1, len: 8 }));

        assert_eq!(map_vertical(Rotation::Deg270, W, H, H, 0, 4), None);
        assert_eq!(map_horizontal(Rotation::Deg0, W, H, 0, -1, 4), None);
    }

    #[test]
    fn test_extreme_inputs_never_overflow() {
        let extremes = [
            (0, 0, i32::MIN),
            (0, 0, 0),
            (i32::MIN, 0, 4),
            (i32::MAX, 0, 4),
            (0, i32::MIN, 4),
            (0, i32::MAX, 4),
            (i32::MAX, i32::MAX, i32::MAX),
            (i32::MIN, i32::MIN, i32::MIN),
        ];
        for turns in 0..4 {
            let rotation = Rotation::from_quarter_turns(turns);
            for &(x, y, len) in &extremes {
                assert_eq!(map_horizontal(rotation, W, H, x, y, len), None, "{:?}", rotation);
                assert_eq!(map_vertical(rotation, W, H, x, y, len), None, "{:?}", rotation);
            }
            // a run covering everything is clipped to the logical extent
            let run = map_horizontal(rotation, W, H, -1, 0, i32::MAX).unwrap();
            assert!(run.len <= W && run.x >= 0 && run.y >= 0, "{:?}", rotation);
        }
    }
}
