//! Records shared by the index unit tests.

/// A record ordered by name first, then mass; usually keyed by mass.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Body {
    pub(crate) name: &'static str,
    pub(crate) mass: Option<u32>,
}

pub(crate) fn body(name: &'static str, mass: u32) -> Body {
    Body {
        name,
        mass: Some(mass),
    }
}

pub(crate) fn massless(name: &'static str) -> Body {
    Body { name, mass: None }
}

/// Key extractor projecting a body onto its mass.
pub(crate) fn mass(b: &Body) -> Option<u32> {
    b.mass
}
