use rustc_hash::{FxHashMap, FxHashSet};

/// Hands out names that are unique within one symbol tree.
///
/// A taken base name gets a numeric suffix: `conv1`, `conv1_1`, `conv1_2`.
#[derive(Debug, Default, Clone)]
pub struct Namer {
    used: FxHashSet<String>,
    next_suffix: FxHashMap<String, usize>,
}

impl Namer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken without renaming it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Returns `base` if it is free, otherwise the first free suffixed form.
    pub fn unique(&mut self, base: &str) -> String {
        let base = sanitize(base);
        if self.used.insert(base.clone()) {
            return base;
        }
        let suffix = self.next_suffix.entry(base.clone()).or_insert(0);
        loop {
            *suffix += 1;
            let candidate = format!("{}_{}", base, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Frees a name. Suffix counters are kept so names are not recycled.
    pub fn release(&mut self, name: &str) {
        self.used.remove(name);
    }
}

/// Turns arbitrary text into an identifier.
fn sanitize(base: &str) -> String {
    let mut name: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("node");
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
