use serde::Serialize;

/// Number of fields of a weighted point record: three coordinates and a weight.
pub const WEIGHTED_POINT_FIELDS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub weight: f64,
}

impl WeightedPoint {
    pub fn new(x: f64, y: f64, z: f64, weight: f64) -> Self {
        Self { x, y, z, weight }
    }

    pub fn to_array(&self) -> [f64; WEIGHTED_POINT_FIELDS] {
        [self.x, self.y, self.z, self.weight]
    }
}

impl From<[f64; WEIGHTED_POINT_FIELDS]> for WeightedPoint {
    fn from(fields: [f64; WEIGHTED_POINT_FIELDS]) -> Self {
        let [x, y, z, weight] = fields;
        Self { x, y, z, weight }
    }
}

#[derive(Debug, Clone)]
pub struct PointCloud {
    pub points: Vec<WeightedPoint>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<WeightedPoint>, source_columns: usize) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        };
        let mut total_weight = 0.0;

        for point in &points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);

            total_weight += point.weight;
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
            source_columns,
            total_weight,
        };

        PointCloud { points, metadata }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// Coordinate extent of the cloud, weights excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
    /// Column count of the table the cloud was normalized from.
    pub source_columns: usize,
    pub total_weight: f64,
}
