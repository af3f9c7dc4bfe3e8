use std::collections::HashMap;

use bevy::prelude::Resource;
use rand::prelude::*;

use crate::core::FlowerColor;
use crate::storage::DiscoveryRecord;

/// Static reference data of one flower species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowerSpecies {
    pub id: &'static str,
    pub name: &'static str,
    pub scientific_name: &'static str,
    pub family: &'static str,
    pub regions: &'static [&'static str],
    pub facts: &'static [&'static str],
    pub color: FlowerColor,
}

pub static SPECIES: &[FlowerSpecies] = &[
    FlowerSpecies {
        id: "poppy",
        name: "Common Poppy",
        scientific_name: "Papaver rhoeas",
        family: "Papaveraceae",
        regions: &["Europe", "North Africa"],
        facts: &[
            "Poppies offer no nectar at all,\nonly heaps of dark pollen.",
            "A poppy flower often lasts just\na single day.",
        ],
        color: FlowerColor::Red,
    },
    FlowerSpecies {
        id: "field-rose",
        name: "Field Rose",
        scientific_name: "Rosa arvensis",
        family: "Rosaceae",
        regions: &["Europe"],
        facts: &[
            "Wild roses keep their pollen easy\nto reach for short-tongued bees.",
            "Rose hips feed birds long after\nthe petals have dropped.",
        ],
        color: FlowerColor::Red,
    },
    FlowerSpecies {
        id: "cornflower",
        name: "Cornflower",
        scientific_name: "Centaurea cyanus",
        family: "Asteraceae",
        regions: &["Europe", "Western Asia"],
        facts: &[
            "Each 'flower' is really a bouquet\nof dozens of tiny florets.",
            "Cornflower blue was once the classic\ncolor of European grain fields.",
        ],
        color: FlowerColor::Blue,
    },
    FlowerSpecies {
        id: "harebell",
        name: "Harebell",
        scientific_name: "Campanula rotundifolia",
        family: "Campanulaceae",
        regions: &["Europe", "North America"],
        facts: &[
            "Its hanging bells shelter pollen\nfrom rain like tiny umbrellas.",
            "Solitary bees sometimes sleep\ninside the closed bells.",
        ],
        color: FlowerColor::Blue,
    },
    FlowerSpecies {
        id: "sunflower",
        name: "Sunflower",
        scientific_name: "Helianthus annuus",
        family: "Asteraceae",
        regions: &["North America"],
        facts: &[
            "A sunflower head can hold more\nthan a thousand little florets.",
            "Young sunflowers turn to follow\nthe sun across the sky.",
        ],
        color: FlowerColor::Yellow,
    },
    FlowerSpecies {
        id: "dandelion",
        name: "Dandelion",
        scientific_name: "Taraxacum officinale",
        family: "Asteraceae",
        regions: &["Worldwide"],
        facts: &[
            "Dandelions are one of the first\nspring meals for hungry bees.",
            "Every seed on the puffball has\nits own little parachute.",
        ],
        color: FlowerColor::Yellow,
    },
    FlowerSpecies {
        id: "lavender",
        name: "Lavender",
        scientific_name: "Lavandula angustifolia",
        family: "Lamiaceae",
        regions: &["Mediterranean"],
        facts: &[
            "Lavender nectar flows strongest\non warm, still afternoons.",
            "Bumblebees can visit a lavender\nspike once every second.",
        ],
        color: FlowerColor::Purple,
    },
    FlowerSpecies {
        id: "crocus",
        name: "Spring Crocus",
        scientific_name: "Crocus vernus",
        family: "Iridaceae",
        regions: &["Alps", "Balkans"],
        facts: &[
            "Crocuses close every night to keep\ntheir pollen warm and dry.",
            "They often bloom straight through\nthe last of the snow.",
        ],
        color: FlowerColor::Purple,
    },
];

pub fn species_by_id(id: &str) -> Option<&'static FlowerSpecies> {
    SPECIES.iter().find(|species| species.id == id)
}

pub fn species_of_color(color: FlowerColor) -> Vec<&'static FlowerSpecies> {
    SPECIES
        .iter()
        .filter(|species| species.color == color)
        .collect()
}

/// What the delivery modal should say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryNote {
    /// First successful delivery of this species ever.
    Discovery(&'static FlowerSpecies),
    /// Already discovered; a random species fact instead.
    Fact(String),
}

impl DeliveryNote {
    pub fn message(&self) -> String {
        match self {
            Self::Discovery(species) => format!(
                "New species discovered!\n{}\n({})",
                species.name, species.scientific_name
            ),
            Self::Fact(fact) => fact.clone(),
        }
    }
}

/// Runtime discovery and collection-count state over the static species
/// table. Counts survive across sessions through the persistence gateway.
#[derive(Resource, Default)]
pub struct FlowerCatalog {
    counts: HashMap<&'static str, u32>,
}

impl FlowerCatalog {
    pub fn from_records(records: &[DiscoveryRecord]) -> Self {
        let mut counts = HashMap::new();
        for record in records {
            // Entries for species removed from the table are dropped.
            if let Some(species) = species_by_id(&record.species_id) {
                counts.insert(species.id, record.count);
            }
        }
        Self { counts }
    }

    pub fn to_records(&self) -> Vec<DiscoveryRecord> {
        let mut records: Vec<DiscoveryRecord> = self
            .counts
            .iter()
            .map(|(id, count)| DiscoveryRecord {
                species_id: (*id).to_string(),
                count: *count,
            })
            .collect();
        records.sort_by(|a, b| a.species_id.cmp(&b.species_id));
        records
    }

    pub fn is_discovered(&self, id: &str) -> bool {
        self.counts.get(id).is_some_and(|count| *count > 0)
    }

    pub fn count(&self, id: &str) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn discovered_count(&self) -> usize {
        self.counts.values().filter(|count| **count > 0).count()
    }

    /// Registers a successful delivery and picks the modal content: the
    /// discovery banner the first time, a random fact afterwards.
    pub fn record_delivery<R: Rng>(
        &mut self,
        species: &'static FlowerSpecies,
        rng: &mut R,
    ) -> DeliveryNote {
        let count = self.counts.entry(species.id).or_insert(0);
        *count += 1;
        if *count == 1 {
            DeliveryNote::Discovery(species)
        } else {
            let fact = species
                .facts
                .iter()
                .choose(rng)
                .copied()
                .unwrap_or(species.name);
            DeliveryNote::Fact(format!("{}\n\n{}", species.name, fact))
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_color_has_species() {
        for color in FlowerColor::iter() {
            assert!(
                !species_of_color(color).is_empty(),
                "no species for {color:?}"
            );
        }
    }

    #[test]
    fn test_species_ids_unique() {
        for (i, a) in SPECIES.iter().enumerate() {
            for b in SPECIES.iter().skip(i + 1) {
                assert_ne!(a.id, b.id, "duplicate species id");
            }
        }
    }

    #[test]
    fn test_first_delivery_is_a_discovery() {
        let mut catalog = FlowerCatalog::default();
        let mut rng = rand::thread_rng();
        let species = species_by_id("poppy").expect("known species");

        assert!(!catalog.is_discovered("poppy"));
        let note = catalog.record_delivery(species, &mut rng);
        assert_eq!(note, DeliveryNote::Discovery(species));
        assert!(catalog.is_discovered("poppy"));
        assert_eq!(catalog.count("poppy"), 1);

        let note = catalog.record_delivery(species, &mut rng);
        assert!(
            matches!(note, DeliveryNote::Fact(_)),
            "second delivery yields a fact"
        );
        assert_eq!(catalog.count("poppy"), 2);
    }

    #[test]
    fn test_records_round_trip() {
        let mut catalog = FlowerCatalog::default();
        let mut rng = rand::thread_rng();
        let poppy = species_by_id("poppy").expect("known species");
        let crocus = species_by_id("crocus").expect("known species");
        catalog.record_delivery(poppy, &mut rng);
        catalog.record_delivery(crocus, &mut rng);
        catalog.record_delivery(crocus, &mut rng);

        let restored = FlowerCatalog::from_records(&catalog.to_records());
        assert_eq!(restored.count("poppy"), 1);
        assert_eq!(restored.count("crocus"), 2);
        assert_eq!(restored.discovered_count(), 2);
    }

    #[test]
    fn test_unknown_species_records_ignored() {
        let records = vec![DiscoveryRecord {
            species_id: "not-a-flower".to_string(),
            count: 7,
        }];
        let catalog = FlowerCatalog::from_records(&records);
        assert_eq!(catalog.discovered_count(), 0);
    }
}
