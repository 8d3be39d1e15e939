use core::fmt;
use core::num::NonZeroU32;

/// Handle to a model component: monomer, parameter, rule, observable or
/// expression. All kinds share one id space, numbered in declaration order.
///
/// Stored as index+1 so `Option<ComponentId>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentId(NonZeroU32);

impl ComponentId {
    /// Id of the component declared at position `index`.
    ///
    /// Saturates at `u32::MAX - 1`.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Declaration position.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Declaration position as a slice index.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.index())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_is_preserved() {
        let ids: Vec<_> = (0..5).map(ComponentId::from_index).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids[3].slot(), 3);
        assert_eq!(ids[3].to_string(), "#3");
        assert_eq!(format!("{:?}", ids[0]), "ComponentId(0)");
    }

    #[test]
    fn optional_id_has_no_overhead() {
        assert_eq!(
            core::mem::size_of::<ComponentId>(),
            core::mem::size_of::<Option<ComponentId>>()
        );
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        assert_eq!(ComponentId::from_index(u32::MAX).index(), u32::MAX - 1);
    }
}
