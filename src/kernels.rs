//! Demo kernels written in SPMD style, and the report the demo prints.

use crate::config::{Kernel, WorkloadConfig};
use crate::context::current_lanes;
use crate::control::{spmd_foreach, spmd_if, spmd_if_else};
use crate::mask::LaneBits;
use crate::vector::{VFloat, Varying};
use log::debug;
use serde::Serialize;

/// One body invocation of the strided loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Index held by lane 0.
    pub base: i32,
    /// Lanes active when the body was entered.
    pub active: LaneBits,
}

/// Result of one demo run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kernel: Kernel,
    pub first: i32,
    pub last: i32,
    pub input: Vec<f32>,
    pub output: Vec<f32>,
    pub invocations: Vec<Invocation>,
}

/// `output[i] = sqrt(max(input[i], threshold))` for `i` in `first..last`.
pub fn clamped_sqrt(
    input: &[f32],
    output: &mut [f32],
    first: i32,
    last: i32,
    threshold: f32,
    mut on_invoke: impl FnMut(Invocation),
) {
    spmd_foreach(first, last, |i| {
        on_invoke(Invocation {
            base: i.first(),
            active: current_lanes(),
        });
        let mut x = i.load_from(input);
        spmd_if(x.lt(threshold), || {
            x.assign(VFloat::splat(threshold));
        });
        i.at(&mut output[..]).store(x.sqrt());
    });
}

/// `output[i] = input[i] < threshold ? -input[i] : input[i]^2` for `i` in `first..last`.
pub fn square_or_negate(
    input: &[f32],
    output: &mut [f32],
    first: i32,
    last: i32,
    threshold: f32,
    mut on_invoke: impl FnMut(Invocation),
) {
    spmd_foreach(first, last, |i| {
        on_invoke(Invocation {
            base: i.first(),
            active: current_lanes(),
        });
        let x = Varying::new(i.load_from(input));
        spmd_if_else(
            x.get().lt(threshold),
            || x.set(-x.get()),
            || x.set(x.get() * x.get()),
        );
        i.at(&mut output[..]).store(x.get());
    });
}

/// Deterministic input: a sawtooth over `[-3, 3]`.
pub fn sample_input(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i % 7) as f32 - 3.0).collect()
}

/// Run the configured kernel over a fresh buffer.
///
/// `workload` must have passed [`crate::config::Config::validate`].
pub fn run(workload: &WorkloadConfig, trace_masks: bool) -> Report {
    let len = workload.last as usize;
    let input = sample_input(len);
    let mut output = vec![0.0; len];
    let mut invocations = Vec::new();
    let record = |inv: Invocation| {
        if trace_masks {
            invocations.push(inv);
        }
    };

    debug!(
        "Running {:?} over [{}, {})",
        workload.kernel, workload.first, workload.last
    );
    match workload.kernel {
        Kernel::ClampedSqrt => clamped_sqrt(
            &input,
            &mut output,
            workload.first,
            workload.last,
            workload.threshold,
            record,
        ),
        Kernel::SquareOrNegate => square_or_negate(
            &input,
            &mut output,
            workload.first,
            workload.last,
            workload.threshold,
            record,
        ),
    }

    Report {
        kernel: workload.kernel,
        first: workload.first,
        last: workload.last,
        input,
        output,
        invocations,
    }
}
