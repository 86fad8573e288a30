use bevy_math::DVec3;

/// Axis-aligned bounding box in world units. `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    pub fn from_bounds(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Self {
        Self::new(DVec3::new(min_x, min_y, min_z), DVec3::new(max_x, max_y, max_z))
    }

    /// Box of the given footprint width and height centred on `center`.
    pub fn from_center(center: DVec3, width: f64, height: f64) -> Self {
        let half = DVec3::new(width * 0.5, height * 0.5, width * 0.5);
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn offset(&mut self, delta: DVec3) {
        self.min += delta;
        self.max += delta;
    }

    pub fn offset_copy(self, delta: DVec3) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Grows the box toward the direction of travel so it covers both the
    /// start and end extents of a move by `delta`.
    pub fn add_coord(self, delta: DVec3) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        if delta.x < 0.0 {
            min.x += delta.x;
        } else if delta.x > 0.0 {
            max.x += delta.x;
        }
        if delta.y < 0.0 {
            min.y += delta.y;
        } else if delta.y > 0.0 {
            max.y += delta.y;
        }
        if delta.z < 0.0 {
            min.z += delta.z;
        } else if delta.z > 0.0 {
            max.z += delta.z;
        }
        Self { min, max }
    }

    pub fn contract(self, x: f64, y: f64, z: f64) -> Self {
        Self {
            min: DVec3::new(self.min.x + x, self.min.y + y, self.min.z + z),
            max: DVec3::new(self.max.x - x, self.max.y - y, self.max.z - z),
        }
    }

    /// Strict interior overlap; boxes sharing a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
            && self.max.z > other.min.z
            && self.min.z < other.max.z
    }

    /// Limits a move of `entity` by `dx` so it stops at this box's face.
    ///
    /// Only applies when the two boxes overlap on Y and Z by more than `eps`.
    /// The result keeps the sign of `dx` and never grows in magnitude.
    pub fn clamp_offset_x(&self, entity: &Aabb, mut dx: f64, eps: f64) -> f64 {
        if !overlaps(entity.min.y, entity.max.y, self.min.y, self.max.y, eps)
            || !overlaps(entity.min.z, entity.max.z, self.min.z, self.max.z, eps)
        {
            return dx;
        }
        if dx > 0.0 && entity.max.x <= self.min.x + eps {
            dx = dx.min((self.min.x - entity.max.x).max(0.0));
        } else if dx < 0.0 && entity.min.x >= self.max.x - eps {
            dx = dx.max((self.max.x - entity.min.x).min(0.0));
        }
        dx
    }

    pub fn clamp_offset_y(&self, entity: &Aabb, mut dy: f64, eps: f64) -> f64 {
        if !overlaps(entity.min.x, entity.max.x, self.min.x, self.max.x, eps)
            || !overlaps(entity.min.z, entity.max.z, self.min.z, self.max.z, eps)
        {
            return dy;
        }
        if dy > 0.0 && entity.max.y <= self.min.y + eps {
            dy = dy.min((self.min.y - entity.max.y).max(0.0));
        } else if dy < 0.0 && entity.min.y >= self.max.y - eps {
            dy = dy.max((self.max.y - entity.min.y).min(0.0));
        }
        dy
    }

    pub fn clamp_offset_z(&self, entity: &Aabb, mut dz: f64, eps: f64) -> f64 {
        if !overlaps(entity.min.x, entity.max.x, self.min.x, self.max.x, eps)
            || !overlaps(entity.min.y, entity.max.y, self.min.y, self.max.y, eps)
        {
            return dz;
        }
        if dz > 0.0 && entity.max.z <= self.min.z + eps {
            dz = dz.min((self.min.z - entity.max.z).max(0.0));
        } else if dz < 0.0 && entity.min.z >= self.max.z - eps {
            dz = dz.max((self.max.z - entity.min.z).min(0.0));
        }
        dz
    }
}

fn overlaps(a_min: f64, a_max: f64, b_min: f64, b_max: f64, eps: f64) -> bool {
    a_max > b_min + eps && a_min < b_max - eps
}
