//! Equal-size subnet division planning and enumeration.
//!
//! [`plan_division`] finds the minimal new prefix length producing at least
//! the requested number of equal subnets; [`SubnetPlan::subnets`] walks them
//! lazily in natural binary order, each step adding 2^(128 - new prefix).

use crate::cancel::{CancelToken, Cancellable};
use crate::error::{PlannerError, PlannerResult};
use crate::models::{Address128, Network, MAX_PREFIX};
use serde::Serialize;

/// The result of a subnet division request.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct SubnetPlan {
    /// Network being divided.
    original: Network,
    /// Subnet count the caller asked for.
    requested: u128,
    /// Minimal prefix length yielding at least `requested` subnets.
    new_prefix: u8,
}

/// Compute the minimal new prefix length giving at least `requested`
/// equal subnets of `network`.
///
/// The count doubles per added prefix bit until it reaches `requested` or
/// the prefix hits /128; exceeding /128 fails with
/// [`PlannerError::SubnetCountUnreachable`].
pub fn plan_division(network: &Network, requested: u128) -> PlannerResult<SubnetPlan> {
    if requested == 0 {
        return Err(PlannerError::SubnetCountInvalid);
    }

    let mut new_prefix = network.prefix();
    let mut max_subnets: u128 = 1;
    while max_subnets < requested && new_prefix < MAX_PREFIX {
        new_prefix += 1;
        match max_subnets.checked_mul(2) {
            Some(doubled) => max_subnets = doubled,
            // 2^128 subnets, which satisfies any representable request
            None => {
                max_subnets = u128::MAX;
                break;
            }
        }
    }

    if new_prefix == MAX_PREFIX && max_subnets < requested {
        return Err(PlannerError::SubnetCountUnreachable { requested });
    }

    log::debug!(
        "plan_division({network}, {requested}) -> /{new_prefix} with {} subnets",
        crate::output::grouped_count(prefix_diff_count(network.prefix(), new_prefix))
    );

    Ok(SubnetPlan {
        original: *network,
        requested,
        new_prefix,
    })
}

// 2^(new - old) subnets, None meaning exactly 2^128 (/0 divided into /128).
fn prefix_diff_count(old_prefix: u8, new_prefix: u8) -> Option<u128> {
    let diff = new_prefix - old_prefix;
    if diff == MAX_PREFIX {
        None
    } else {
        Some(1u128 << diff)
    }
}

impl SubnetPlan {
    /// The network being divided.
    pub fn original(&self) -> Network {
        self.original
    }

    /// The subnet count the caller requested.
    pub fn requested(&self) -> u128 {
        self.requested
    }

    /// The minimal prefix length satisfying the request.
    pub fn new_prefix(&self) -> u8 {
        self.new_prefix
    }

    /// Actual subnet count, always a power of two >= the requested count.
    /// `None` means exactly 2^128.
    pub fn subnet_count(&self) -> Option<u128> {
        prefix_diff_count(self.original.prefix(), self.new_prefix)
    }

    /// Address span of one subnet; `None` means the whole 2^128 space
    /// (only when dividing /0 into a single /0 "subnet").
    pub fn subnet_step(&self) -> Option<u128> {
        if self.new_prefix == 0 {
            None
        } else {
            Some(1u128 << (MAX_PREFIX - self.new_prefix))
        }
    }

    /// Lazy enumeration of the subnets in natural binary order. Fresh
    /// iterator per call, restartable and boundable with `take`.
    pub fn subnets(&self) -> SubnetIter {
        SubnetIter {
            next_base: Some(self.original.network_address().value()),
            last_base: self.original.broadcast_address().value(),
            step: self.subnet_step(),
            prefix: self.new_prefix,
        }
    }

    /// Subnets with a cancellation token checked before every element.
    pub fn subnets_cancellable(&self, token: CancelToken) -> Cancellable<SubnetIter> {
        Cancellable::new(self.subnets(), token)
    }

    /// The 1-based `index`-th subnet, located by direct offset arithmetic.
    pub fn subnet_at(&self, index: u128) -> PlannerResult<Network> {
        if index == 0 {
            return Err(PlannerError::ExportRange(format!(
                "subnet index {index} must be >= 1"
            )));
        }
        if let Some(count) = self.subnet_count() {
            if index > count {
                return Err(PlannerError::ExportRange(format!(
                    "subnet index {index} exceeds subnet count {count}"
                )));
            }
        }
        let step = match self.subnet_step() {
            Some(step) => step,
            // single whole-space subnet, index validated to 1 above
            None => return Network::from_address(self.original.network_address(), 0),
        };
        let offset = step
            .checked_mul(index - 1)
            .ok_or_else(|| PlannerError::OutOfRange(format!("subnet offset {step} * {index}")))?;
        let base = self.original.network_address().checked_add(offset)?;
        Network::from_address(base, self.new_prefix)
    }
}

/// Lazy iterator over the subnets of a [`SubnetPlan`].
#[derive(Debug, Clone)]
pub struct SubnetIter {
    next_base: Option<u128>,
    last_base: u128,
    step: Option<u128>,
    prefix: u8,
}

impl Iterator for SubnetIter {
    type Item = Network;

    fn next(&mut self) -> Option<Network> {
        let base = self.next_base?;
        self.next_base = match self.step {
            Some(step) => match base.checked_add(step) {
                Some(next) if next <= self.last_base => Some(next),
                _ => None,
            },
            // a 2^128 step: the single subnet covers everything
            None => None,
        };
        // prefix was validated when the plan was built
        Network::from_address(Address128::from(base), self.prefix).ok()
    }
}
