/// Outcome of advancing a [`Sequence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    /// Next item
    Item(T),
    /// No items left
    Exhausted,
}

/// Finite sequence with an explicit exhausted state
///
/// A new queue is built for every unit and every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<T> {
    items: Vec<T>,
    position: usize,
}

impl<T> Sequence<T> {
    /// Sequence positioned before its first item
    pub const fn new(items: Vec<T>) -> Self {
        Self { items, position: 0 }
    }

    /// Moves to the next item
    pub fn advance(&mut self) -> Step<&T> {
        match self.items.get(self.position) {
            Some(item) => {
                self.position += 1;
                Step::Item(item)
            }
            None => Step::Exhausted,
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_until_exhausted() {
        let mut seq = Sequence::new(vec!["a", "b"]);
        assert_eq!(seq.advance(), Step::Item(&"a"));
        assert_eq!(seq.advance(), Step::Item(&"b"));
        assert_eq!(seq.advance(), Step::Exhausted);
        assert_eq!(seq.advance(), Step::Exhausted);
    }

    #[test]
    fn test_empty_is_exhausted() {
        let mut seq: Sequence<u8> = Sequence::default();
        assert_eq!(seq.advance(), Step::Exhausted);
    }
}
