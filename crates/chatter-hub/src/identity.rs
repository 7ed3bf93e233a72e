use rand::Rng;

/// Base names handed out to new connections.
pub const NAME_POOL: [&str; 26] = [
    "Alice", "Bob", "Charlie", "David", "Eva", "Frank", "Grace", "Henry", "Ivy", "Jack", "Kathy",
    "Luke", "Mia", "Nathan", "Olivia", "Peter", "Quinn", "Rachel", "Sam", "Tina", "Ulysses",
    "Violet", "Walter", "Xena", "Yvonne", "Zack",
];

/// Inclusive upper bound of the numeric suffix (lower bound is 1).
pub const NAME_SUFFIX_MAX: u32 = 1000;

/// Random display name such as `"Alice742"`.
///
/// No uniqueness check against live connections: two clients can get the same
/// name.
pub fn generate_name() -> String {
    generate_name_with(&mut rand::rng())
}

pub fn generate_name_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let base = NAME_POOL[rng.random_range(0..NAME_POOL.len())];
    let suffix = rng.random_range(1..=NAME_SUFFIX_MAX);
    format!("{base}{suffix}")
}
