//! Capability sets gating which features a mapped span participates in

use bitflags::bitflags;

bitflags! {
    /// Which feature classes are valid across a mapped correspondence.
    ///
    /// Every mapping segment carries one of these. Lookups supply a filter
    /// over the set, so e.g. a formatter only sees spans marked [`FORMAT`]
    /// while go-to-definition only sees spans marked [`NAVIGATION`].
    ///
    /// [`FORMAT`]: CapabilitySet::FORMAT
    /// [`NAVIGATION`]: CapabilitySet::NAVIGATION
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct CapabilitySet: u8 {
        /// Go-to-definition, references, highlights.
        const NAVIGATION = 1 << 0;
        /// Completion and signature help.
        const COMPLETION = 1 << 1;
        /// Hover, semantic tokens, inlay hints.
        const SEMANTIC = 1 << 2;
        /// Document symbols, folding, selection ranges.
        const STRUCTURE = 1 << 3;
        /// Formatting edits.
        const FORMAT = 1 << 4;
        /// Diagnostics.
        const VERIFICATION = 1 << 5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_and_union() {
        let caps = CapabilitySet::NAVIGATION | CapabilitySet::COMPLETION;
        assert!(caps.contains(CapabilitySet::NAVIGATION));
        assert!(!caps.contains(CapabilitySet::FORMAT));
        assert!(CapabilitySet::all().contains(caps));
    }

    #[test]
    fn default_is_empty() {
        assert!(CapabilitySet::default().is_empty());
    }

    #[test]
    fn serialization_round_trip() {
        let caps = CapabilitySet::NAVIGATION | CapabilitySet::VERIFICATION;
        let json = serde_json::to_string(&caps).unwrap();
        let back: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(caps, back);
    }
}
