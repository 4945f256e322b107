//! bench/plan.rs
//! Which (library, options) configurations a run benchmarks.
//!
//! Client and server derive the same plan from the same request, so the order
//! produced here is part of the protocol.

use crate::compression::{CodecError, CodecRegistry, Parameter};
use crate::constants::WORK_FACTOR_STEP;
use crate::options::Options;
use crate::smash::Smash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub library: String,
    pub options: Options,
}

/// Every legal option combination of `smash`, starting from `base`.
///
/// Walks level, mode (for the current level), window, work factor (step 50),
/// shuffle and threads. A parameter the engine does not support contributes a
/// single pass with its `base` value.
pub fn all_options(smash: &Smash, base: Options) -> Vec<Options> {
    let mut out = Vec::new();
    walk(smash, 0, base, &mut out);
    out
}

fn walk(smash: &Smash, depth: usize, current: Options, out: &mut Vec<Options>) {
    let Some(&param) = Parameter::ALL.get(depth) else {
        out.push(current);
        return;
    };

    let info = smash.parameter_info(param, &current);
    if !info.supported || info.minimum > info.maximum {
        walk(smash, depth + 1, current, out);
        return;
    }

    let step = if param == Parameter::WorkFactor {
        WORK_FACTOR_STEP
    } else {
        1
    };
    let mut value = info.minimum;
    loop {
        let mut next = current;
        param.apply(&mut next, value);
        walk(smash, depth + 1, next, out);

        match value.checked_add(step) {
            Some(v) if v <= info.maximum => value = v,
            _ => break,
        }
    }
}

/// Expand `library` (`all` means every registered engine) and, with
/// `best_effort`, every engine's option space.
pub fn plan(
    registry: &CodecRegistry,
    library: &str,
    options: Options,
    best_effort: bool,
) -> Result<Vec<Configuration>, CodecError> {
    let mut configurations = Vec::new();
    for name in registry.expand(library) {
        let smash = Smash::with_registry(registry, &name)?;
        let variants = if best_effort {
            all_options(&smash, options)
        } else {
            vec![options]
        };
        log::debug!("[PLAN] {}: {} configurations", name, variants.len());
        configurations.extend(variants.into_iter().map(|options| Configuration {
            library: name.clone(),
            options,
        }));
    }
    Ok(configurations)
}

/// One-line description of `options` restricted to what `smash` supports,
/// e.g. `zstd level=3 window=20 shuffle=none threads=1`.
pub fn describe_options(smash: &Smash, options: &Options) -> String {
    let mut out = smash.name().to_string();
    for param in Parameter::ALL {
        let info = smash.parameter_info(param, options);
        if !info.supported {
            continue;
        }
        let key = match param {
            Parameter::CompressionLevel => "level",
            Parameter::Mode => "mode",
            Parameter::WindowSize => "window",
            Parameter::WorkFactor => "work_factor",
            Parameter::Shuffle => "shuffle",
            Parameter::NumberThreads => "threads",
        };
        out.push_str(&format!(" {}={}", key, info.label(param.value_of(options))));
    }
    out
}
