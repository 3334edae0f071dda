use uuid::Uuid;

/// Source of fresh instance ids.
///
/// The engine additionally refuses any id it has already seen in the session,
/// so generators only need to be unlikely to repeat, not collision-proof.
pub trait IdGenerator: Send {
    fn next_id(&mut self, type_id: &str) -> String;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self, type_id: &str) -> String {
        (**self).next_id(type_id)
    }
}

/// `{type}_{uuid}` ids. Default for interactive sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, type_id: &str) -> String {
        format!("{type_id}_{}", Uuid::new_v4().simple())
    }
}

/// `{type}_{n}` ids with a session-wide counter. Deterministic, which keeps
/// fixtures and snapshots stable.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, type_id: &str) -> String {
        let id = format!("{type_id}_{}", self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_across_types() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id("hero"), "hero_1");
        assert_eq!(ids.next_id("stat"), "stat_2");
        assert_eq!(ids.next_id("hero"), "hero_3");
    }

    #[test]
    fn uuid_ids_are_prefixed_and_distinct() {
        let mut ids = UuidIds;
        let first = ids.next_id("hero");
        let second = ids.next_id("hero");
        assert!(first.starts_with("hero_"));
        assert_ne!(first, second);
    }
}
