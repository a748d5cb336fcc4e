//! BB84 key exchange with a noisy link and an optional intercept-resend
//! eavesdropper.
//!
//! A session runs in four stages, each exposed on its own:
//! [`exchange`] sends the qubits, [`sift`] keeps the positions where sender
//! and receiver bases agree, [`disclose`] compares a public prefix of the
//! sifted keys, and [`detection_threshold`] turns the expected channel error
//! count into the eavesdropper test. [`simulate`] chains them into a
//! [`SessionRecord`].

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::SessionConfig;
use crate::core::errors::{SimulationError, StateError};
use crate::core::{Basis, NoiseChannel, NoiseKind, QuantumState};
use crate::sampler::RandomSource;

/// Per-party choices and outcomes of one exchange, indexed by qubit.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub sender_bases: Vec<Basis>,
    pub sender_bits: Vec<bool>,
    /// Drawn even without eavesdropping so the other parties' draws do not
    /// depend on the eavesdropping flag.
    pub eavesdropper_bases: Vec<Basis>,
    /// Empty when nobody eavesdrops.
    pub eavesdropper_bits: Vec<bool>,
    pub receiver_bases: Vec<Basis>,
    pub receiver_bits: Vec<bool>,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.sender_bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender_bits.is_empty()
    }
}

/// Sender and receiver keys restricted to matching-basis positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiftedKeys {
    pub sender: Vec<bool>,
    pub receiver: Vec<bool>,
    /// Basis shared by both parties at each sifted position.
    pub bases: Vec<Basis>,
}

impl SiftedKeys {
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Quantum bit error rate of the sifted key, overall and per basis.
    pub fn qber(&self) -> MismatchRatios {
        MismatchRatios::from_positions(
            self.bases
                .iter()
                .zip(self.sender.iter().zip(&self.receiver))
                .map(|(&basis, (&s, &r))| (basis, s != r)),
        )
    }
}

/// Outcome of comparing the public prefix of the sifted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Disclosure {
    pub disclosed_bits: usize,
    pub mismatches: usize,
}

/// Fraction of positions where sender and receiver bits differ.
///
/// `z` and `x` restrict the count to positions the sender encoded in that
/// basis. An empty denominator gives 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MismatchRatios {
    pub global: f64,
    pub z: f64,
    pub x: f64,
}

impl MismatchRatios {
    fn from_positions(positions: impl Iterator<Item = (Basis, bool)>) -> Self {
        let (mut total, mut total_miss) = (0usize, 0usize);
        let (mut z_total, mut z_miss) = (0usize, 0usize);
        let (mut x_total, mut x_miss) = (0usize, 0usize);

        for (basis, mismatch) in positions {
            let miss = usize::from(mismatch);
            total += 1;
            total_miss += miss;
            match basis {
                Basis::Z => {
                    z_total += 1;
                    z_miss += miss;
                }
                Basis::X => {
                    x_total += 1;
                    x_miss += miss;
                }
            }
        }

        Self {
            global: ratio(total_miss, total),
            z: ratio(z_miss, z_total),
            x: ratio(x_miss, x_total),
        }
    }

    /// Ratios over every sent qubit, keyed by the sender's basis.
    pub fn over_all_qubits(transcript: &Transcript) -> Self {
        Self::from_positions(
            transcript
                .sender_bases
                .iter()
                .zip(transcript.sender_bits.iter().zip(&transcript.receiver_bits))
                .map(|(&basis, (&s, &r))| (basis, s != r)),
        )
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Inputs and outputs of one simulated session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub config: SessionConfig,
    /// Mismatch over all L qubits: global, Z-encoded, X-encoded.
    pub global_mismatch_ratio: f64,
    pub z_mismatch_ratio: f64,
    pub x_mismatch_ratio: f64,
    pub eavesdropper_detected: bool,
    pub sifted_length: usize,
    pub disclosed_bits: usize,
    pub disclosed_mismatches: usize,
    pub threshold: usize,
    /// Mismatch within the sifted key.
    pub qber: MismatchRatios,
}

impl SessionRecord {
    /// `(global, z, x, detected)`
    pub fn outputs(&self) -> (f64, f64, f64, bool) {
        (
            self.global_mismatch_ratio,
            self.z_mismatch_ratio,
            self.x_mismatch_ratio,
            self.eavesdropper_detected,
        )
    }

    fn log_summary(&self) {
        let c = &self.config;
        if c.verbose {
            info!(
                seed = c.seed,
                sifted = self.sifted_length,
                disclosed = self.disclosed_bits,
                mismatched = self.disclosed_mismatches,
                threshold = self.threshold,
                global = self.global_mismatch_ratio,
                z = self.z_mismatch_ratio,
                x = self.x_mismatch_ratio,
                detected = self.eavesdropper_detected,
                "bb84 session"
            );
        } else {
            debug!(
                seed = c.seed,
                sifted = self.sifted_length,
                disclosed = self.disclosed_bits,
                mismatched = self.disclosed_mismatches,
                threshold = self.threshold,
                global = self.global_mismatch_ratio,
                z = self.z_mismatch_ratio,
                x = self.x_mismatch_ratio,
                detected = self.eavesdropper_detected,
                "bb84 session"
            );
        }
    }
}

/// Sends `config.qubit_count` qubits from sender to receiver.
///
/// Draw order on `rng`: sender bases, sender bits, eavesdropper bases,
/// receiver bases (L each), then per qubit the eavesdropper's measurement
/// (if any) followed by the receiver's.
///
/// Without eavesdropping the link noise hits the sender's state. With
/// eavesdropping the sender-to-eavesdropper hop is clean and the noise hits
/// the state the eavesdropper re-prepares from her outcome.
pub fn exchange(
    config: &SessionConfig,
    channel: &NoiseChannel,
    rng: &mut RandomSource,
) -> Result<Transcript, StateError> {
    let num_qubits = config.qubit_count;

    let sender_bases = rng.bases(num_qubits);
    let sender_bits = rng.bits(num_qubits);
    let eavesdropper_bases = rng.bases(num_qubits);
    let receiver_bases = rng.bases(num_qubits);

    let mut eavesdropper_bits = Vec::with_capacity(if config.eavesdropping {
        num_qubits
    } else {
        0
    });
    let mut receiver_bits = Vec::with_capacity(num_qubits);

    for i in 0..num_qubits {
        // Sender prepares the qubit
        let mut state = QuantumState::prepare(sender_bases[i], sender_bits[i]);

        if config.eavesdropping {
            // Intercept, measure and resend through the noisy hop
            let e_bit = state.measure_in(eavesdropper_bases[i], rng)?;
            eavesdropper_bits.push(e_bit);
            state = QuantumState::prepare(eavesdropper_bases[i], e_bit).with_noise(channel);
        } else {
            state.apply_channel(channel);
        }

        // Receiver measures
        let r_bit = state.measure_in(receiver_bases[i], rng)?;
        receiver_bits.push(r_bit);

        trace!(
            qubit = i,
            sender_basis = %sender_bases[i],
            sender_bit = sender_bits[i],
            receiver_basis = %receiver_bases[i],
            receiver_bit = r_bit,
            "qubit exchanged"
        );
    }

    Ok(Transcript {
        sender_bases,
        sender_bits,
        eavesdropper_bases,
        eavesdropper_bits,
        receiver_bases,
        receiver_bits,
    })
}

/// Keeps the positions where sender and receiver chose the same basis,
/// preserving qubit order.
pub fn sift(transcript: &Transcript) -> SiftedKeys {
    let mut keys = SiftedKeys::default();

    for i in 0..transcript.len() {
        if transcript.sender_bases[i] == transcript.receiver_bases[i] {
            keys.sender.push(transcript.sender_bits[i]);
            keys.receiver.push(transcript.receiver_bits[i]);
            keys.bases.push(transcript.sender_bases[i]);
        }
    }

    keys
}

/// Compares the first `floor(fraction * sifted length)` bits of both keys.
pub fn disclose(keys: &SiftedKeys, fraction: f64) -> Disclosure {
    let disclosed_bits = ((fraction * keys.len() as f64).floor() as usize).min(keys.len());

    let mismatches = keys.sender[..disclosed_bits]
        .iter()
        .zip(&keys.receiver[..disclosed_bits])
        .filter(|(s, r)| s != r)
        .count();

    Disclosure {
        disclosed_bits,
        mismatches,
    }
}

/// Largest disclosed mismatch count still attributed to channel noise.
///
/// - no noise: 0
/// - bit flip or phase flip alone: `floor(n * p / 2)`
/// - both: `floor(n * p)`
pub fn detection_threshold(kind: NoiseKind, disclosed_bits: usize, probability: f64) -> usize {
    let n = disclosed_bits as f64;
    match kind {
        NoiseKind::None => 0,
        NoiseKind::BitFlip | NoiseKind::PhaseFlip => (n * probability / 2.0).floor() as usize,
        NoiseKind::BitPhaseFlip => (n * probability).floor() as usize,
    }
}

/// Runs one session on a caller-provided random source.
pub fn run(
    config: &SessionConfig,
    rng: &mut RandomSource,
) -> Result<SessionRecord, SimulationError> {
    config.validate()?;
    let channel = NoiseChannel::from_flags(
        config.bit_flip,
        config.phase_flip,
        config.noise_probability,
    )?;

    let transcript = exchange(config, &channel, rng)?;
    let keys = sift(&transcript);
    let disclosure = disclose(&keys, config.disclosed_fraction);
    let threshold = detection_threshold(
        channel.kind(),
        disclosure.disclosed_bits,
        config.noise_probability,
    );
    let ratios = MismatchRatios::over_all_qubits(&transcript);

    let record = SessionRecord {
        config: config.clone(),
        global_mismatch_ratio: ratios.global,
        z_mismatch_ratio: ratios.z,
        x_mismatch_ratio: ratios.x,
        eavesdropper_detected: disclosure.mismatches > threshold,
        sifted_length: keys.len(),
        disclosed_bits: disclosure.disclosed_bits,
        disclosed_mismatches: disclosure.mismatches,
        threshold,
        qber: keys.qber(),
    };
    record.log_summary();

    Ok(record)
}

/// Runs one session seeded from `config.seed`.
///
/// Identical configurations give identical records.
pub fn simulate(config: &SessionConfig) -> Result<SessionRecord, SimulationError> {
    config.validate()?;
    let mut rng = RandomSource::from_seed(config.seed);
    run(config, &mut rng)
}

/// Positional form of [`simulate`], returning `(global, z, x, detected)`.
#[allow(clippy::too_many_arguments)]
pub fn simulate_bb84(
    qubit_count: usize,
    eavesdropping: bool,
    bit_flip: bool,
    phase_flip: bool,
    noise_probability: f64,
    disclosed_fraction: f64,
    seed: u64,
    verbose: bool,
) -> Result<(f64, f64, f64, bool), SimulationError> {
    let config = SessionConfig {
        qubit_count,
        eavesdropping,
        bit_flip,
        phase_flip,
        noise_probability,
        disclosed_fraction,
        seed,
        verbose,
    };
    Ok(simulate(&config)?.outputs())
}
