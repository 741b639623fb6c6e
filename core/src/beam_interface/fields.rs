use serde::{Deserialize, Serialize};

/// Moments and polarimetric products computed for one gate.
///
/// `None` means not computed or not valid for the polarization mode. On the
/// wire every `None` is written as [`crate::prelude::MISSING_DBL`] and read back as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(with = "sentinel")]
    pub dbm: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbmhc: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbmvc: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbmvx: Option<f64>,
    #[serde(with = "sentinel")]
    pub snr: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbz: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbzhc: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbzvc: Option<f64>,
    #[serde(with = "sentinel")]
    pub dbzvx: Option<f64>,
    #[serde(with = "sentinel")]
    pub vel: Option<f64>,
    #[serde(with = "sentinel")]
    pub width: Option<f64>,
    #[serde(with = "sentinel")]
    pub zdr: Option<f64>,
    #[serde(with = "sentinel")]
    pub zdrm: Option<f64>,
    #[serde(with = "sentinel")]
    pub phidp: Option<f64>,
    #[serde(with = "sentinel")]
    pub rhohv: Option<f64>,
    #[serde(with = "sentinel")]
    pub ldrh: Option<f64>,
}

impl Fields {
    pub const NAMES: [&'static str; 16] = [
        "dbm", "dbmhc", "dbmvc", "dbmvx", "snr", "dbz", "dbzhc", "dbzvc", "dbzvx", "vel",
        "width", "zdr", "zdrm", "phidp", "rhohv", "ldrh",
    ];

    pub fn missing() -> Self {
        Self::default()
    }

    /// Values in [`Fields::NAMES`] order, with the sentinel for missing ones.
    pub fn to_sentinel_array(&self) -> [f64; 16] {
        [
            self.dbm,
            self.dbmhc,
            self.dbmvc,
            self.dbmvx,
            self.snr,
            self.dbz,
            self.dbzhc,
            self.dbzvc,
            self.dbzvx,
            self.vel,
            self.width,
            self.zdr,
            self.zdrm,
            self.phidp,
            self.rhohv,
            self.ldrh,
        ]
        .map(sentinel::encode)
    }
}

mod sentinel {
    use crate::prelude::MISSING_DBL;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn encode(value: Option<f64>) -> f64 {
        match value {
            Some(v) if v.is_finite() => v,
            _ => MISSING_DBL,
        }
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(encode(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(if value == MISSING_DBL { None } else { Some(value) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::MISSING_DBL;

    #[test]
    fn missing_fields_serialize_as_sentinel() {
        let fields = Fields {
            dbz: Some(12.5),
            ..Fields::missing()
        };
        let json = serde_json::to_value(fields).unwrap();
        assert_eq!(json["dbz"], 12.5);
        assert_eq!(json["vel"], MISSING_DBL);
        assert_eq!(json["ldrh"], MISSING_DBL);
    }

    #[test]
    fn sentinel_reads_back_as_none() {
        let fields = Fields {
            vel: Some(-3.25),
            rhohv: Some(0.98),
            ..Fields::missing()
        };
        let text = serde_json::to_string(&fields).unwrap();
        let back: Fields = serde_json::from_str(&text).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn sentinel_array_follows_name_order() {
        let fields = Fields {
            dbm: Some(-60.0),
            ldrh: Some(-25.0),
            ..Fields::missing()
        };
        let values = fields.to_sentinel_array();
        assert_eq!(values[0], -60.0);
        assert_eq!(values[15], -25.0);
        assert_eq!(values[9], MISSING_DBL);
        assert_eq!(Fields::NAMES[15], "ldrh");
    }

    #[test]
    fn non_finite_values_are_written_as_missing() {
        let fields = Fields {
            snr: Some(f64::NAN),
            ..Fields::missing()
        };
        assert_eq!(fields.to_sentinel_array()[4], MISSING_DBL);
    }
}
