/// FileHub Engine — Hub Name and Domain Generator
///
/// Used by setup and by the domain-block recovery flow. Every generated
/// domain passes `validate_domain`.

use std::collections::BTreeSet;

use rand::Rng;

use crate::error::{EngineError, EngineResult};

pub const MAX_DOMAIN_LEN: usize = 63;
const MAX_GENERATED_LEN: usize = 25;

const NAME_PREFIXES: &[&str] = &[
    "Hub", "Center", "Bit", "Share", "Download", "Upload", "Files", "File", "Sharing", "P2P",
    "Peer", "Net",
];

const NAME_WORDS: &[&str] = &[
    "", "World", "Club", "Zone", "Center", "Portal", "Service", "Top", "Best", "First", "Main",
    "Prime",
];

const NAME_SUFFIXES: &[&str] = &[
    "Zone", "World", "Hub", "Center", "Club", "Portal", "Service", "X", "Pro", "Premium", "Plus",
    "Max", "Super", "Ultra",
];

const TLDS: &[&str] = &[
    "com", "net", "org", "io", "co", "ru", "su", "by", "kz", "ua", "hub", "share", "sync", "cloud",
    "bit", "download", "upload", "files", "file", "peer",
];

const DOMAIN_STEMS: &[&str] = &[
    "hub", "share", "sync", "bit", "download", "upload", "files", "p2p", "peer", "cloud", "file",
    "dl", "up",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Random display name, e.g. "Share Portal Pro".
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if rng.gen_bool(0.5) {
        parts.push(pick(rng, NAME_PREFIXES));
    }
    let word = pick(rng, NAME_WORDS);
    if !word.is_empty() {
        parts.push(word);
    }
    if rng.gen_bool(0.3) {
        parts.push(pick(rng, NAME_SUFFIXES));
    }
    if parts.is_empty() {
        parts = vec!["File", "Hub"];
    }
    parts.join(" ")
}

/// Random domain in one of three shapes: stem+number, word, or hubNNN.
pub fn generate_domain<R: Rng + ?Sized>(rng: &mut R) -> String {
    let domain = match rng.gen_range(0..3) {
        0 => {
            let stem = pick(rng, DOMAIN_STEMS);
            let n: u32 = rng.gen_range(1..=99);
            format!("{}{}.{}", stem, n, pick(rng, TLDS))
        }
        1 => {
            let word = if rng.gen_bool(0.5) {
                pick(rng, NAME_PREFIXES)
            } else {
                pick(rng, NAME_SUFFIXES)
            };
            let label: String = word
                .chars()
                .filter(|c| !c.is_whitespace())
                .flat_map(|c| c.to_lowercase())
                .collect();
            format!("{}.{}", label, pick(rng, TLDS))
        }
        _ => {
            let n: u32 = rng.gen_range(100..=999);
            format!("hub{}.{}", n, pick(rng, TLDS))
        }
    };

    if domain.len() > MAX_GENERATED_LEN {
        let n: u32 = rng.gen_range(1000..=9999);
        return format!("fh{}.{}", n, pick(rng, TLDS));
    }
    domain
}

/// Up to `count` (name, domain) pairs with distinct domains.
pub fn generate_options<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<(String, String)> {
    let mut options = Vec::with_capacity(count);
    let mut seen = BTreeSet::new();
    let max_attempts = count.saturating_mul(20);
    let mut attempts = 0;
    while options.len() < count && attempts < max_attempts {
        attempts += 1;
        let name = generate_name(rng);
        let domain = generate_domain(rng);
        if seen.insert(domain.clone()) {
            options.push((name, domain));
        }
    }
    options
}

/// `label.tld`: label is ASCII alphanumeric with inner hyphens only, the
/// TLD is two or more ASCII letters, total length at most 63.
pub fn validate_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return false;
    }
    let Some((label, tld)) = domain.split_once('.') else {
        return false;
    };
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    for ch in label.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return false;
        }
    }
    true
}

pub fn check_domain(domain: &str) -> EngineResult<()> {
    if validate_domain(domain) {
        Ok(())
    } else {
        Err(EngineError::InvalidDomain(domain.to_string()))
    }
}
