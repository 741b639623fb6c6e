use momentscore::calibration::Channel;
use momentscore::prelude::Complex64;
use momentscore::PolarizationMode;

/// Amplitude and phase offset of the echo seen on one pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Echo {
    pub amplitude: f64,
    pub phase_rad: f64,
}

impl Echo {
    pub fn new(amplitude: f64, phase_rad: f64) -> Self {
        Self {
            amplitude,
            phase_rad,
        }
    }
}

/// Per-gate echo strengths for the co-polar and cross-polar returns.
#[derive(Debug, Clone, Copy)]
pub struct GateEchoes {
    pub h: Echo,
    pub v: Echo,
    pub cross: Echo,
}

/// Echo pattern one receiver channel sees across the pulse train.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseTemplate {
    Constant(Echo),
    /// Even and odd pulses differ, as with alternating H/V transmit.
    Alternating { even: Echo, odd: Echo },
}

impl PulseTemplate {
    pub fn for_channel(mode: PolarizationMode, channel: Channel, echoes: &GateEchoes) -> Self {
        match (mode, channel) {
            (PolarizationMode::DualFastAlt, Channel::Hc) => PulseTemplate::Alternating {
                even: echoes.h,
                odd: echoes.cross,
            },
            (PolarizationMode::DualFastAlt, Channel::Vc) => PulseTemplate::Alternating {
                even: echoes.cross,
                odd: echoes.v,
            },
            (_, Channel::Hc) => PulseTemplate::Constant(echoes.h),
            (_, Channel::Vc) => PulseTemplate::Constant(echoes.v),
            (_, Channel::Hx) | (_, Channel::Vx) => PulseTemplate::Constant(echoes.cross),
        }
    }

    /// Noise-free sample of `pulse` for a Doppler phase step in radians.
    pub fn sample(&self, pulse: usize, phase_step: f64) -> Complex64 {
        let echo = match *self {
            PulseTemplate::Constant(echo) => echo,
            PulseTemplate::Alternating { even, odd } => {
                if pulse % 2 == 0 {
                    even
                } else {
                    odd
                }
            }
        };
        Complex64::from_polar(echo.amplitude, phase_step * pulse as f64 + echo.phase_rad)
    }
}
