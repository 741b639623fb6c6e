//! Per-beam orchestration: windowing, estimation, calibration and the
//! polarimetric products for each compute path.

use crate::beam_interface::{BeamInfo, BeamIq, Fields, PolarizationMode};
use crate::calibration::{Channel, RangeCorrectionTable, RangeGeometry};
use crate::math::complex::{mean_power, split_alternating};
use crate::math::stats::StatsHelper;
use crate::math::window::apply_window;
use crate::prelude::{
    nyquist_velocity, Complex64, MomentEstimator, MomentsConfig, MomentsError, MomentsResult,
};
use crate::processing::dual_pol::fast_alt_products;
use crate::processing::estimator::build_estimator;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::HashMap;

/// Signal power used when the measured power does not exceed the noise.
const NOISE_FLOOR_EPSILON: f64 = 1.0e-20;

const MIN_SAMPLES_SINGLE: usize = 2;
const MIN_SAMPLES_DUAL: usize = 4;

/// Calibrated power products of one channel at one gate.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelPower {
    dbm: Option<f64>,
    snr: Option<f64>,
    dbz: Option<f64>,
}

pub struct MomentsMgr {
    config: MomentsConfig,
    estimator: Box<dyn MomentEstimator>,
    range_corr: RangeCorrectionTable,
    windows: HashMap<usize, Vec<f64>>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl MomentsMgr {
    pub fn new(config: MomentsConfig) -> MomentsResult<Self> {
        config.validate()?;
        let estimator = build_estimator(config.algorithm, config.wavelength_m());
        let geometry = RangeGeometry::from_config(&config);
        let range_corr = match config.max_gates {
            Some(n_gates) => RangeCorrectionTable::with_gates(geometry, n_gates),
            None => RangeCorrectionTable::new(geometry),
        };
        let logger = LogManager::new();
        logger.record(&format!(
            "moments manager ready: {} estimator, {:?} window, wavelength {:.2} cm",
            estimator.name(),
            config.window,
            config.wavelength_cm
        ));
        Ok(Self {
            config,
            estimator,
            range_corr,
            windows: HashMap::new(),
            logger,
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn config(&self) -> &MomentsConfig {
        &self.config
    }

    pub fn estimator_name(&self) -> &'static str {
        self.estimator.name()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Per-gate range correction in dB, as currently cached.
    pub fn range_correction(&self) -> &[f64] {
        self.range_corr.as_slice()
    }

    /// Grows the range correction table to cover `n_gates`.
    pub fn check_range_correction(&mut self, n_gates: usize) {
        if self.range_corr.check(n_gates) {
            self.logger.record(&format!(
                "range correction table rebuilt for {} gates",
                n_gates
            ));
        }
    }

    /// Moves the gate geometry; the cached correction is rebuilt if it changed.
    pub fn set_gate_geometry(&mut self, start_range_km: f64, gate_spacing_km: f64) -> MomentsResult<()> {
        let mut candidate = self.config.clone();
        candidate.start_range_km = start_range_km;
        candidate.gate_spacing_km = gate_spacing_km;
        candidate.validate()?;
        self.config = candidate;
        if self.range_corr.set_geometry(RangeGeometry::from_config(&self.config)) {
            self.logger.record(&format!(
                "gate geometry now {:.3} km + {:.3} km/gate",
                start_range_km, gate_spacing_km
            ));
        }
        Ok(())
    }

    /// Computes every field for a beam, picking the path from `mode`.
    pub fn compute(&mut self, beam: &BeamIq, mode: PolarizationMode) -> MomentsResult<Vec<Fields>> {
        let mut fields = vec![Fields::missing(); beam.info.n_gates];
        match mode {
            PolarizationMode::Single => {
                self.compute_single(&beam.info, beam.channel(Channel::Hc)?, &mut fields)?
            }
            PolarizationMode::DualFastAlt => self.compute_dual_fast_alt(
                &beam.info,
                beam.channel(Channel::Hc)?,
                beam.channel(Channel::Vc)?,
                &mut fields,
            )?,
            PolarizationMode::DualCp2Xband => self.compute_dual_cp2_xband(
                &beam.info,
                beam.channel(Channel::Hc)?,
                beam.channel(Channel::Vx)?,
                &mut fields,
            )?,
        }
        Ok(fields)
    }

    /// Single polarization, H transmit and HC receive.
    pub fn compute_single(
        &mut self,
        beam: &BeamInfo,
        iq_hc: ArrayView2<'_, Complex64>,
        fields: &mut [Fields],
    ) -> MomentsResult<()> {
        let n_samples = self.prepare(
            beam,
            &[(Channel::Hc, iq_hc.dim())],
            fields.len(),
            MIN_SAMPLES_SINGLE,
        )?;
        self.prepare_window(n_samples);
        self.logger.beam("single", beam);

        let gates = &mut fields[..beam.n_gates];
        self.fill_gates(gates, |gate, out| {
            self.single_gate(beam.prt_secs, gate, &gate_series(iq_hc, gate), out)
        });
        self.finish_beam(gates);
        Ok(())
    }

    /// Fast-alternating H/V transmit with HC and VC receive.
    ///
    /// Even pulses carry the H transmit, odd pulses the V transmit.
    pub fn compute_dual_fast_alt(
        &mut self,
        beam: &BeamInfo,
        iq_hc: ArrayView2<'_, Complex64>,
        iq_vc: ArrayView2<'_, Complex64>,
        fields: &mut [Fields],
    ) -> MomentsResult<()> {
        let n_samples = self.prepare(
            beam,
            &[(Channel::Hc, iq_hc.dim()), (Channel::Vc, iq_vc.dim())],
            fields.len(),
            MIN_SAMPLES_DUAL,
        )?;
        self.prepare_window(n_samples / 2);
        self.logger.beam("dual fast-alternating", beam);

        let gates = &mut fields[..beam.n_gates];
        self.fill_gates(gates, |gate, out| {
            self.fast_alt_gate(
                beam.prt_secs,
                gate,
                &gate_series(iq_hc, gate),
                &gate_series(iq_vc, gate),
                out,
            )
        });
        self.finish_beam(gates);
        Ok(())
    }

    /// H transmit with HC co-polar and VX cross-polar receive.
    pub fn compute_dual_cp2_xband(
        &mut self,
        beam: &BeamInfo,
        iq_hc: ArrayView2<'_, Complex64>,
        iq_vx: ArrayView2<'_, Complex64>,
        fields: &mut [Fields],
    ) -> MomentsResult<()> {
        let n_samples = self.prepare(
            beam,
            &[(Channel::Hc, iq_hc.dim()), (Channel::Vx, iq_vx.dim())],
            fields.len(),
            MIN_SAMPLES_SINGLE,
        )?;
        self.prepare_window(n_samples);
        self.logger.beam("dual cp2 x-band", beam);

        let gates = &mut fields[..beam.n_gates];
        self.fill_gates(gates, |gate, out| {
            self.cp2_xband_gate(
                beam.prt_secs,
                gate,
                &gate_series(iq_hc, gate),
                &gate_series(iq_vx, gate),
                out,
            )
        });
        self.finish_beam(gates);
        Ok(())
    }

    /// Checks `(gates, pulses)` shapes and grows the range table. Returns
    /// the pulse count.
    fn prepare(
        &mut self,
        beam: &BeamInfo,
        channels: &[(Channel, (usize, usize))],
        n_fields: usize,
        min_samples: usize,
    ) -> MomentsResult<usize> {
        let n_samples = match validate_beam(beam, channels, n_fields, min_samples) {
            Ok(n_samples) => n_samples,
            Err(err) => {
                self.metrics.record_rejected();
                self.logger.warn(&format!("beam rejected: {}", err));
                return Err(err);
            }
        };
        self.check_range_correction(beam.n_gates);
        Ok(n_samples)
    }

    fn prepare_window(&mut self, n: usize) {
        let window = self.config.window;
        self.windows
            .entry(n)
            .or_insert_with(|| window.normalized_weights(n));
    }

    fn window(&self, n: usize) -> Cow<'_, [f64]> {
        match self.windows.get(&n) {
            Some(weights) => Cow::Borrowed(weights.as_slice()),
            None => Cow::Owned(self.config.window.normalized_weights(n)),
        }
    }

    fn fill_gates<F>(&self, gates: &mut [Fields], compute_gate: F)
    where
        F: Fn(usize, &mut Fields) + Send + Sync,
    {
        if self.config.parallel_gates {
            gates
                .par_iter_mut()
                .enumerate()
                .for_each(|(gate, out)| compute_gate(gate, out));
        } else {
            gates
                .iter_mut()
                .enumerate()
                .for_each(|(gate, out)| compute_gate(gate, out));
        }
    }

    fn finish_beam(&self, gates: &[Fields]) {
        let missing = gates.iter().filter(|f| f.dbm.is_none()).count();
        self.metrics.record_beam(gates.len(), missing);
    }

    fn single_gate(&self, prt_secs: f64, gate: usize, iq: &[Complex64], out: &mut Fields) {
        *out = Fields::missing();
        let windowed = apply_window(iq, &self.window(iq.len()));
        let moments = self.estimator.estimate(&windowed, prt_secs);
        let hc = self.calibrate(moments.power, Channel::Hc, gate);

        out.dbm = hc.dbm;
        out.snr = hc.snr;
        out.dbz = hc.dbz;
        (out.vel, out.width) = self.censor(hc.snr, moments.vel, moments.width);
    }

    fn fast_alt_gate(
        &self,
        prt_secs: f64,
        gate: usize,
        hc: &[Complex64],
        vc: &[Complex64],
        out: &mut Fields,
    ) {
        *out = Fields::missing();
        let (iqh, _) = split_alternating(hc);
        let (iq_vx, iqv) = split_alternating(vc);
        let half = iqh.len().min(iqv.len());
        let (iqh, iqv) = (&iqh[..half], &iqv[..half]);
        let window = self.window(half);

        let moments_h = self.estimator.estimate(&apply_window(iqh, &window), prt_secs);
        let moments_v = self.estimator.estimate(&apply_window(iqv, &window), prt_secs);
        let h = self.calibrate(moments_h.power, Channel::Hc, gate);
        let v = self.calibrate(moments_v.power, Channel::Vc, gate);

        out.dbmhc = h.dbm;
        out.dbzhc = h.dbz;
        out.dbmvc = v.dbm;
        out.dbzvc = v.dbz;
        out.dbm = mean_of(h.dbm, v.dbm);
        out.snr = mean_of(h.snr, v.snr);
        out.dbz = mean_of(h.dbz, v.dbz);
        out.zdr = difference(h.dbz, v.dbz).map(|zdr| zdr + self.config.zdr_correction_db);
        out.zdrm = difference(h.snr, v.snr);

        let wavelength_m = self.config.wavelength_m();
        // correlations use the unweighted halves
        let products = fast_alt_products(iqh, iqv, nyquist_velocity(wavelength_m, prt_secs));
        out.phidp = products.phidp_deg;
        out.rhohv = products.rhohv;
        (out.vel, out.width) = self.censor(
            out.snr,
            products.vel,
            mean_of(moments_h.width, moments_v.width),
        );

        let vx = self.calibrate(Some(mean_power(&iq_vx)), Channel::Vx, gate);
        out.dbmvx = vx.dbm;
        out.dbzvx = vx.dbz;
        out.ldrh = difference(vx.dbz, h.dbz).map(|ldr| ldr + self.config.ldr_correction_db);
    }

    fn cp2_xband_gate(
        &self,
        prt_secs: f64,
        gate: usize,
        hc: &[Complex64],
        vx: &[Complex64],
        out: &mut Fields,
    ) {
        self.single_gate(prt_secs, gate, hc, out);
        out.dbmhc = out.dbm;
        out.dbzhc = out.dbz;

        let cross = self.calibrate(Some(mean_power(vx)), Channel::Vx, gate);
        out.dbmvx = cross.dbm;
        out.dbzvx = cross.dbz;
        out.ldrh = difference(cross.dbz, out.dbzhc).map(|ldr| ldr + self.config.ldr_correction_db);
    }

    /// dBm, SNR and reflectivity for a linear power on `channel` at `gate`.
    fn calibrate(&self, power: Option<f64>, channel: Channel, gate: usize) -> ChannelPower {
        let Some(power) = power.filter(|p| p.is_finite() && *p > 0.0) else {
            return ChannelPower::default();
        };
        let receiver = self.config.calibration.receiver(channel);
        let noise = receiver.noise_power();
        let signal = if power <= noise {
            NOISE_FLOOR_EPSILON
        } else {
            power - noise
        };
        let snr = StatsHelper::power_to_db(signal / noise);
        ChannelPower {
            dbm: StatsHelper::power_to_db(power),
            snr,
            dbz: snr.map(|snr| snr + receiver.dbz0() + self.range_correction_at(gate)),
        }
    }

    fn range_correction_at(&self, gate: usize) -> f64 {
        self.range_corr.get(gate).unwrap_or_else(|| {
            let geometry = self.range_corr.geometry();
            geometry.correction(geometry.range_km(gate))
        })
    }

    fn censor(&self, snr: Option<f64>, vel: Option<f64>, width: Option<f64>) -> (Option<f64>, Option<f64>) {
        match (self.config.snr_threshold_db, snr) {
            (Some(threshold), Some(snr)) if snr < threshold => (None, None),
            (Some(_), None) => (None, None),
            _ => (vel, width),
        }
    }
}

fn validate_beam(
    beam: &BeamInfo,
    channels: &[(Channel, (usize, usize))],
    n_fields: usize,
    min_samples: usize,
) -> MomentsResult<usize> {
    if !(beam.prt_secs.is_finite() && beam.prt_secs > 0.0) {
        return Err(MomentsError::InvalidInput(format!(
            "prt must be positive, got {}",
            beam.prt_secs
        )));
    }
    if n_fields < beam.n_gates {
        return Err(MomentsError::InvalidInput(format!(
            "output holds {} gates, beam has {}",
            n_fields, beam.n_gates
        )));
    }
    let n_samples = channels.first().map(|&(_, (_, pulses))| pulses).unwrap_or(0);
    for &(channel, (n_rows, n_pulses)) in channels {
        if n_rows < beam.n_gates {
            return Err(MomentsError::InvalidInput(format!(
                "channel {} holds {} gates, beam has {}",
                channel.label(),
                n_rows,
                beam.n_gates
            )));
        }
        if n_pulses != n_samples {
            return Err(MomentsError::InvalidInput(format!(
                "channel {} holds {} pulses, expected {}",
                channel.label(),
                n_pulses,
                n_samples
            )));
        }
    }
    if n_samples < min_samples {
        return Err(MomentsError::InvalidInput(format!(
            "{} pulses per gate, need at least {}",
            n_samples, min_samples
        )));
    }
    Ok(n_samples)
}

/// Pulse series of one gate, borrowed when the row is contiguous.
fn gate_series(iq: ArrayView2<'_, Complex64>, gate: usize) -> Cow<'_, [Complex64]> {
    let row = iq.index_axis_move(Axis(0), gate);
    match row.to_slice() {
        Some(samples) => Cow::Borrowed(samples),
        None => Cow::Owned(row.to_vec()),
    }
}

fn mean_of(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    a.zip(b).map(|(a, b)| (a + b) / 2.0)
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    a.zip(b).map(|(a, b)| a - b)
}
