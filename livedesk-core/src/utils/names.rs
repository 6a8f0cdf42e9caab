use rand::seq::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "Agile", "Bold", "Brave", "Calm", "Clever", "Curious", "Daring", "Eager", "Fancy",
    "Gentle", "Happy", "Jolly", "Kind", "Lively", "Lucky", "Mighty", "Nimble", "Proud",
    "Quick", "Quiet", "Shy", "Swift", "Witty", "Zany",
];

const ANIMALS: &[&str] = &[
    "Badger", "Bear", "Beaver", "Bison", "Camel", "Cheetah", "Dolphin", "Eagle", "Falcon",
    "Fox", "Gecko", "Giraffe", "Hedgehog", "Koala", "Lemur", "Lynx", "Moose", "Otter",
    "Owl", "Panda", "Penguin", "Rabbit", "Raven", "Tiger", "Walrus", "Wombat", "Yak",
];

/// Display name for a visitor who has not told us theirs, e.g. `Swift Otter`.
pub fn random_animal_name() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Anonymous");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("Visitor");
    format!("{adjective} {animal}")
}
