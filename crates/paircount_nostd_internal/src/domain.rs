//! Describes the axis-aligned box that holds the points, and implements the
//! minimum-image convention for periodic axes.

/// An axis-aligned box, `[0, L_x] × [0, L_y] × [0, L_z]`, where each axis may
/// independently be periodic.
///
/// Along a periodic axis, coordinates are wrapped into `[0, L)` and
/// separations use the minimum image. Along a non-periodic axis, coordinates
/// must already lie inside `[0, L]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    lengths: [f64; 3],
    periodic: [bool; 3],
}

impl Domain {
    pub fn new(lengths: [f64; 3], periodic: [bool; 3]) -> Result<Domain, &'static str> {
        if lengths.iter().any(|l| !l.is_finite()) {
            Err("domain lengths must be finite")
        } else if lengths.iter().any(|l| *l <= 0.0) {
            Err("domain lengths must be positive")
        } else {
            Ok(Domain { lengths, periodic })
        }
    }

    /// a cube with side-length `length` that is periodic along every axis
    pub fn periodic_cube(length: f64) -> Result<Domain, &'static str> {
        Domain::new([length; 3], [true; 3])
    }

    /// a box that isn't periodic along any axis
    pub fn non_periodic(lengths: [f64; 3]) -> Result<Domain, &'static str> {
        Domain::new(lengths, [false; 3])
    }

    pub fn lengths(&self) -> &[f64; 3] {
        &self.lengths
    }

    pub fn periodic(&self) -> &[bool; 3] {
        &self.periodic
    }

    /// Maps a coordinate along `axis` into the domain.
    ///
    /// Returns `None` when the coordinate isn't finite or when it lies outside
    /// of `[0, L]` along a non-periodic axis.
    #[inline]
    pub fn wrap_coord(&self, axis: usize, x: f64) -> Option<f64> {
        let length = self.lengths[axis];
        if !x.is_finite() {
            None
        } else if self.periodic[axis] {
            let mut wrapped = x % length;
            if wrapped < 0.0 {
                wrapped += length;
            }
            // adding length to a tiny negative remainder can round up to length
            if wrapped >= length {
                wrapped = 0.0;
            }
            Some(wrapped)
        } else if (0.0..=length).contains(&x) {
            Some(x)
        } else {
            None
        }
    }

    /// Computes the displacement vector pointing from `a` to `b`.
    ///
    /// Both positions must already be wrapped into the domain. Along periodic
    /// axes, each component is the minimum image (`d`, `d - L` or `d + L`,
    /// whichever has the smallest magnitude).
    #[inline(always)]
    pub fn displacement(&self, a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for k in 0..3 {
            let mut d = b[k] - a[k];
            if self.periodic[k] {
                let half = 0.5 * self.lengths[k];
                if d > half {
                    d -= self.lengths[k];
                } else if d < -half {
                    d += self.lengths[k];
                }
            }
            out[k] = d;
        }
        out
    }
}
