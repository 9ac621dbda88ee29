use log::info;
use structures::Event;

/// Orders events by placement time. Events placed at the same instant keep their input order,
/// so replaying the same dataset always produces the same canvas.
pub fn sequence(events: &mut [Event]) {
    info!("Sorting data...");

    // sort_by_key is stable; sort_unstable_by_key would shuffle simultaneous placements
    events.sort_by_key(|event| event.placed_at);
}

pub fn is_sequenced(events: &[Event]) -> bool {
    events
        .windows(2)
        .all(|pair| pair[0].placed_at <= pair[1].placed_at)
}
