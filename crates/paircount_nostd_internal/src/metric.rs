//! The distance metrics used to characterize the separation of a pair.
//!
//! Each metric maps the minimum-image displacement vector of a pair to a key.
//! Keys hold squared separations: comparing `s ≤ r` as `s² ≤ r²` is
//! equivalent for non-negative quantities and avoids `sqrt` (which isn't
//! available in `core`).

/// Maps the displacement vector of a pair to the key consumed by a kernel.
pub trait Metric: Sync {
    type Key: Copy;

    fn key(&self, displacement: &[f64; 3]) -> Self::Key;
}

/// The axis treated as the line-of-sight (the "distant observer"
/// approximation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineOfSight {
    X,
    Y,
    #[default]
    Z,
}

impl LineOfSight {
    pub fn axis(&self) -> usize {
        match self {
            LineOfSight::X => 0,
            LineOfSight::Y => 1,
            LineOfSight::Z => 2,
        }
    }

    /// the two axes spanning the plane perpendicular to the line of sight
    pub fn perpendicular_axes(&self) -> [usize; 2] {
        match self {
            LineOfSight::X => [1, 2],
            LineOfSight::Y => [0, 2],
            LineOfSight::Z => [0, 1],
        }
    }
}

/// The full 3D euclidean distance. The key is the squared separation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    type Key = f64;

    #[inline(always)]
    fn key(&self, d: &[f64; 3]) -> f64 {
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    }
}

/// Separation split into the components perpendicular (`rp`) and parallel
/// (`π`) to the line of sight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedKey {
    pub rp_squared: f64,
    pub pi_squared: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Projected {
    pub line_of_sight: LineOfSight,
}

impl Metric for Projected {
    type Key = ProjectedKey;

    #[inline(always)]
    fn key(&self, d: &[f64; 3]) -> ProjectedKey {
        let [a, b] = self.line_of_sight.perpendicular_axes();
        let pi = d[self.line_of_sight.axis()];
        ProjectedKey {
            rp_squared: d[a] * d[a] + d[b] * d[b],
            pi_squared: pi * pi,
        }
    }
}

/// The redshift-space separation `s` and the parallel separation, from
/// which `mu = |π| / s` is derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SMuKey {
    pub s_squared: f64,
    pub pi_squared: f64,
}

impl SMuKey {
    /// `mu²`, which is defined as exactly 0 when `s == 0`
    #[inline]
    pub fn mu_squared(&self) -> f64 {
        if self.s_squared == 0.0 {
            0.0
        } else {
            self.pi_squared / self.s_squared
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SMu {
    pub line_of_sight: LineOfSight,
}

impl Metric for SMu {
    type Key = SMuKey;

    #[inline(always)]
    fn key(&self, d: &[f64; 3]) -> SMuKey {
        let pi = d[self.line_of_sight.axis()];
        SMuKey {
            s_squared: d[0] * d[0] + d[1] * d[1] + d[2] * d[2],
            pi_squared: pi * pi,
        }
    }
}

/// A key holding two squared quantities, used to fill 2D cumulative
/// histograms. `outer` indexes the slow axis of the output.
pub trait TwoComponentKey: Copy {
    fn outer_squared(&self) -> f64;
    fn inner_squared(&self) -> f64;
}

impl TwoComponentKey for ProjectedKey {
    #[inline(always)]
    fn outer_squared(&self) -> f64 {
        self.rp_squared
    }

    #[inline(always)]
    fn inner_squared(&self) -> f64 {
        self.pi_squared
    }
}

impl TwoComponentKey for SMuKey {
    #[inline(always)]
    fn outer_squared(&self) -> f64 {
        self.s_squared
    }

    #[inline(always)]
    fn inner_squared(&self) -> f64 {
        self.mu_squared()
    }
}
