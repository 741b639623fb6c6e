use crate::prelude::MomentsConfig;

/// Gate geometry and the constants feeding the range correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeGeometry {
    pub start_range_km: f64,
    pub gate_spacing_km: f64,
    pub atmos_attenuation_db_per_km: f64,
    pub calib_correction_db: f64,
}

impl RangeGeometry {
    pub fn from_config(config: &MomentsConfig) -> Self {
        Self {
            start_range_km: config.start_range_km,
            gate_spacing_km: config.gate_spacing_km,
            atmos_attenuation_db_per_km: config.atmos_attenuation_db_per_km,
            calib_correction_db: config.dbz_calib_correction_db,
        }
    }

    pub fn range_km(&self, gate: usize) -> f64 {
        self.start_range_km + gate as f64 * self.gate_spacing_km
    }

    /// Correction in dB at a range. No spreading term inside 1 km.
    pub fn correction(&self, range_km: f64) -> f64 {
        let base = self.calib_correction_db + range_km * self.atmos_attenuation_db_per_km;
        if range_km <= 1.0 {
            base
        } else {
            base + 20.0 * range_km.log10()
        }
    }
}

/// Lazily grown per-gate range correction, in dB.
///
/// The table only grows; a request for fewer gates than cached is a no-op.
#[derive(Debug, Clone)]
pub struct RangeCorrectionTable {
    geometry: RangeGeometry,
    values: Vec<f64>,
}

impl RangeCorrectionTable {
    pub fn new(geometry: RangeGeometry) -> Self {
        Self {
            geometry,
            values: Vec::new(),
        }
    }

    pub fn with_gates(geometry: RangeGeometry, n_gates: usize) -> Self {
        let mut table = Self::new(geometry);
        table.check(n_gates);
        table
    }

    /// Ensures at least `n_gates` entries. Returns true if the table was rebuilt.
    pub fn check(&mut self, n_gates: usize) -> bool {
        if n_gates <= self.values.len() {
            return false;
        }
        self.values = Self::build(&self.geometry, n_gates);
        true
    }

    /// Replaces the geometry, rebuilding at the current size if it changed.
    pub fn set_geometry(&mut self, geometry: RangeGeometry) -> bool {
        if geometry == self.geometry {
            return false;
        }
        self.geometry = geometry;
        self.values = Self::build(&self.geometry, self.values.len());
        true
    }

    fn build(geometry: &RangeGeometry, n_gates: usize) -> Vec<f64> {
        (0..n_gates)
            .map(|gate| geometry.correction(geometry.range_km(gate)))
            .collect()
    }

    pub fn geometry(&self) -> &RangeGeometry {
        &self.geometry
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, gate: usize) -> Option<f64> {
        self.values.get(gate).copied()
    }
}
