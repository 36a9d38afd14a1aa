use std::collections::HashMap;

/// Which sequence a generated name is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    Organization,
    Vlan,
    Network,
    Ip,
    Nic,
    Nat,
}

impl Sequence {
    pub fn prefix(&self) -> &'static str {
        match self {
            Sequence::Organization => "ORG",
            Sequence::Vlan => "VLAN",
            Sequence::Network => "NET",
            Sequence::Ip => "IP",
            Sequence::Nic => "NIC",
            Sequence::Nat => "NAT",
        }
    }
}

/// Source of human-readable names for records created without one.
pub trait NameSequence {
    fn next_name(&mut self, sequence: Sequence) -> String;
}

/// Per-sequence counters producing `NET00001`, `NET00002`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialNames {
    counters: HashMap<Sequence, u32>,
}

impl SequentialNames {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameSequence for SequentialNames {
    fn next_name(&mut self, sequence: Sequence) -> String {
        let counter = self.counters.entry(sequence).or_insert(0);
        *counter += 1;
        format!("{}{:05}", sequence.prefix(), counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_independent() {
        let mut names = SequentialNames::new();
        assert_eq!(names.next_name(Sequence::Network), "NET00001");
        assert_eq!(names.next_name(Sequence::Network), "NET00002");
        assert_eq!(names.next_name(Sequence::Ip), "IP00001");
        assert_eq!(names.next_name(Sequence::Organization), "ORG00001");
        assert_eq!(names.next_name(Sequence::Network), "NET00003");
    }
}
