//! Axis swizzle: which world axis plays grid width, depth and height.

use serde::{Deserialize, Serialize};
use crate::core::types::Vec3;

/// Logical grid axis. `X` and `Y` span the painting plane, `Z` is "up".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    fn slot(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// The six permutations mapping logical (X, Y, Z) onto world axes.
///
/// The name lists the world axis used for logical X, Y and Z in that order,
/// so `Xzy` reads logical Y from world Z and logical Z (up) from world Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisSwizzle {
    Xyz,
    #[default]
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl AxisSwizzle {
    pub const ALL: [AxisSwizzle; 6] = [
        AxisSwizzle::Xyz,
        AxisSwizzle::Xzy,
        AxisSwizzle::Yxz,
        AxisSwizzle::Yzx,
        AxisSwizzle::Zxy,
        AxisSwizzle::Zyx,
    ];

    /// World component indices for logical X, Y, Z
    #[inline]
    const fn table(self) -> [usize; 3] {
        match self {
            AxisSwizzle::Xyz => [0, 1, 2],
            AxisSwizzle::Xzy => [0, 2, 1],
            AxisSwizzle::Yxz => [1, 0, 2],
            AxisSwizzle::Yzx => [1, 2, 0],
            AxisSwizzle::Zxy => [2, 0, 1],
            AxisSwizzle::Zyx => [2, 1, 0],
        }
    }

    /// World component index that backs `axis`
    #[inline]
    pub fn world_index(self, axis: Axis) -> usize {
        self.table()[axis.slot()]
    }

    /// Read the logical `axis` component out of a world vector
    #[inline]
    pub fn resolve_axis(self, vector: Vec3, axis: Axis) -> f32 {
        vector[self.world_index(axis)]
    }

    /// Build a world vector from logical components (inverse of `resolve_axis`)
    #[inline]
    pub fn compose(self, x: f32, y: f32, z: f32) -> Vec3 {
        let [ix, iy, iz] = self.table();
        let mut out = [0.0f32; 3];
        out[ix] = x;
        out[iy] = y;
        out[iz] = z;
        Vec3::from_array(out)
    }

    /// World vector -> logical (X, Y, Z)
    #[inline]
    pub fn to_logical(self, world: Vec3) -> Vec3 {
        let [ix, iy, iz] = self.table();
        Vec3::new(world[ix], world[iy], world[iz])
    }

    /// Logical (X, Y, Z) -> world vector
    #[inline]
    pub fn to_world(self, logical: Vec3) -> Vec3 {
        self.compose(logical.x, logical.y, logical.z)
    }

    /// World component index of the up axis
    #[inline]
    pub fn up_index(self) -> usize {
        self.world_index(Axis::Z)
    }

    /// Unit world vector along the up axis
    #[inline]
    pub fn up_vector(self) -> Vec3 {
        Vec3::AXES[self.up_index()]
    }
}

/// Free-function form of [`AxisSwizzle::resolve_axis`]
#[inline]
pub fn resolve_axis(vector: Vec3, axis: Axis, swizzle: AxisSwizzle) -> f32 {
    swizzle.resolve_axis(vector, axis)
}

/// Free-function form of [`AxisSwizzle::compose`]
#[inline]
pub fn compose(x: f32, y: f32, z: f32, swizzle: AxisSwizzle) -> Vec3 {
    swizzle.compose(x, y, z)
}
