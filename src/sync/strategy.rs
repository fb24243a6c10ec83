use super::{NonFastForwardPolicy, PushStrategy};
use crate::git::PushFlags;

/// Ordered push attempts for one target; the first success ends the chain
///
/// `Direct` always comes first. The upstream retry is only added when the
/// caller did not already ask for `--set-upstream`, and the policy step is
/// last (`Skip` adds nothing).
pub fn fallback_chain(flags: PushFlags, policy: NonFastForwardPolicy) -> Vec<PushStrategy> {
    let mut chain = vec![PushStrategy::Direct];
    if !flags.set_upstream {
        chain.push(PushStrategy::SetUpstreamRetry);
    }
    match policy {
        NonFastForwardPolicy::Skip => {}
        NonFastForwardPolicy::Rebase => chain.push(PushStrategy::Rebase),
        NonFastForwardPolicy::ForceWithLease => chain.push(PushStrategy::ForceWithLease),
        NonFastForwardPolicy::Force => chain.push(PushStrategy::Force),
    }
    chain
}

/// Flags for a plain push attempt under `strategy`
pub(crate) fn flags_for(strategy: PushStrategy, base: PushFlags) -> PushFlags {
    match strategy {
        PushStrategy::Direct | PushStrategy::Rebase => base,
        PushStrategy::SetUpstreamRetry => PushFlags {
            set_upstream: true,
            ..base
        },
        PushStrategy::ForceWithLease => PushFlags {
            force_with_lease: true,
            ..base
        },
        PushStrategy::Force => PushFlags {
            force: true,
            force_with_lease: false,
            ..base
        },
    }
}
