//! Seed collection for the in-memory transport

use contracts::HeroRecord;

/// The ten heroes every fresh in-memory collection starts with
pub fn seed_heroes() -> Vec<HeroRecord> {
    [
        (11, "Dr Nice"),
        (12, "Narco"),
        (13, "Bombasto"),
        (14, "Celeritas"),
        (15, "Magneta"),
        (16, "RubberMan"),
        (17, "Dynama"),
        (18, "Dr IQ"),
        (19, "Magma"),
        (20, "Tornado"),
    ]
    .into_iter()
    .map(|(id, name)| HeroRecord::new(id, name))
    .collect()
}
