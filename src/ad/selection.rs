use crate::ad::model::{Advertisement, SlotType};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Pick one eligible ad for `slot`, uniformly at random.
///
/// Eligible means active, placed in `slot`, and passing
/// [`Advertisement::validate`]. Returns `None` when nothing qualifies,
/// which callers treat as "no ad for this slot, go straight through".
///
/// The randomness source is injected so tests can seed it.
pub fn select_candidate<'a, R>(
    pool: &'a [Advertisement],
    slot: SlotType,
    rng: &mut R,
) -> Option<&'a Advertisement>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&Advertisement> = pool.iter().filter(|ad| is_eligible(ad, slot)).collect();

    let picked = eligible.choose(rng).copied();

    debug!(
        "Selection for {:?}: {} of {} candidates eligible, picked {:?}",
        slot,
        eligible.len(),
        pool.len(),
        picked.map(|ad| ad.id.as_str())
    );

    picked
}

fn is_eligible(ad: &Advertisement, slot: SlotType) -> bool {
    if !ad.is_active || ad.slot_type != slot {
        return false;
    }

    match ad.validate() {
        Ok(()) => true,
        Err(reason) => {
            debug!("Ad {} excluded from selection: {}", ad.id, reason);
            false
        }
    }
}
