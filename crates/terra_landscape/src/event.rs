//! Generation lifecycle events

use std::fmt;
use terra_core::glam::Vec3;
use terra_core::mailbox::Mailbox;

/// Mailbox between the generator's jobs and the landscape event system.
pub type GeneratorEventQueue = Mailbox<GeneratorEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GeneratorEventKind {
    /// A generation pass was scheduled.
    Started,
    /// A region finished generating.
    Generated,
    /// A region was dropped.
    Deleted,
}

impl fmt::Display for GeneratorEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Generated => "generated",
            Self::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Immutable record of one lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorEvent {
    pub kind: GeneratorEventKind,
    /// World-space centre of the region.
    pub position: Vec3,
    /// Half-sizes of the region along each axis.
    pub extent: Vec3,
}

impl GeneratorEvent {
    pub fn new(kind: GeneratorEventKind, position: Vec3, extent: Vec3) -> Self {
        Self {
            kind,
            position,
            extent,
        }
    }

    pub fn started(position: Vec3, extent: Vec3) -> Self {
        Self::new(GeneratorEventKind::Started, position, extent)
    }

    pub fn generated(position: Vec3, extent: Vec3) -> Self {
        Self::new(GeneratorEventKind::Generated, position, extent)
    }

    pub fn deleted(position: Vec3, extent: Vec3) -> Self {
        Self::new(GeneratorEventKind::Deleted, position, extent)
    }
}
