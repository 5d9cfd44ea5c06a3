use crate::error::Result;
use crate::polygonizer::{PolygonizeOutput, Polygonizer};
use crate::utils::parallel;
use geo_types::Geometry;

/// Polygonizes independent sets of lines, one graph per set.
///
/// Batches share no state, so with the `parallel` feature they run on the
/// rayon pool. Results come back in batch order.
pub struct BatchPolygonizer {
    pub check_rings_valid: bool,
    pub extract_only_polygonal: bool,
    batches: Vec<Vec<Geometry<f64>>>,
}

impl Default for BatchPolygonizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchPolygonizer {
    pub fn new() -> Self {
        Self {
            check_rings_valid: true,
            extract_only_polygonal: false,
            batches: Vec::new(),
        }
    }

    pub fn with_extract_only_polygonal(mut self, only_polygonal: bool) -> Self {
        self.extract_only_polygonal = only_polygonal;
        self
    }

    pub fn with_check_rings_valid(mut self, check: bool) -> Self {
        self.check_rings_valid = check;
        self
    }

    /// Adds one independent input set and returns its batch index.
    pub fn add_batch(&mut self, geometries: Vec<Geometry<f64>>) -> usize {
        self.batches.push(geometries);
        self.batches.len() - 1
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn polygonize(&self) -> Vec<Result<PolygonizeOutput>> {
        let process_batch = |batch: &Vec<Geometry<f64>>| -> Result<PolygonizeOutput> {
            let mut local_poly = Polygonizer::new();
            local_poly.check_rings_valid = self.check_rings_valid;
            local_poly.extract_only_polygonal = self.extract_only_polygonal;
            local_poly.add_geometries(batch.iter().cloned());
            local_poly.into_output()
        };

        parallel::map_collect(&self.batches, process_batch)
    }
}
