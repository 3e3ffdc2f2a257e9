//! Integer line rasterization shared by the path smoother and the vision system.

/// Bresenham rasterization between two signed grid points.
///
/// Yields every cell on the line in order from `start` to `end`, both
/// endpoints inclusive. Coordinates are signed so rays may be traced past the
/// grid edge; callers decide how out-of-bounds cells are treated.
#[derive(Clone, Debug)]
pub struct GridLine {
    x: i64,
    z: i64,
    end_x: i64,
    end_z: i64,
    dx: i64,
    dz: i64,
    step_x: i64,
    step_z: i64,
    error: i64,
    finished: bool,
}

impl GridLine {
    /// Creates a rasterizer from `start` to `end`, given as `(x, z)` pairs.
    #[must_use]
    pub fn new(start: (i64, i64), end: (i64, i64)) -> Self {
        let dx = (end.0 - start.0).abs();
        let dz = -(end.1 - start.1).abs();
        Self {
            x: start.0,
            z: start.1,
            end_x: end.0,
            end_z: end.1,
            dx,
            dz,
            step_x: if start.0 < end.0 { 1 } else { -1 },
            step_z: if start.1 < end.1 { 1 } else { -1 },
            error: dx + dz,
            finished: false,
        }
    }
}

impl Iterator for GridLine {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let current = (self.x, self.z);
        if self.x == self.end_x && self.z == self.end_z {
            self.finished = true;
            return Some(current);
        }

        let doubled = 2 * self.error;
        if doubled >= self.dz {
            self.error += self.dz;
            self.x += self.step_x;
        }
        if doubled <= self.dx {
            self.error += self.dx;
            self.z += self.step_z;
        }

        Some(current)
    }
}
