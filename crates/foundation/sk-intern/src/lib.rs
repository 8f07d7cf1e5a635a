//! String interning for symbol names
//!
//! A compilation is owned by a single caller, so the interner is a plain
//! single-threaded `Rodeo` behind a `RefCell` rather than a locked shared
//! table.

pub use lasso::Spur as Name;
use lasso::Rodeo;
use std::cell::RefCell;

/// String interner handing out copyable [`Name`] keys
pub struct Interner {
    inner: RefCell<Rodeo>,
    empty: Name,
}

impl Interner {
    pub fn new() -> Self {
        let mut rodeo = Rodeo::new();
        let empty = rodeo.get_or_intern_static("");
        Self {
            inner: RefCell::new(rodeo),
            empty,
        }
    }

    pub fn intern(&self, text: &str) -> Name {
        self.inner.borrow_mut().get_or_intern(text)
    }

    pub fn resolve(&self, name: Name) -> String {
        self.inner.borrow().resolve(&name).to_string()
    }

    pub fn try_resolve(&self, name: Name) -> Option<String> {
        self.inner
            .borrow()
            .try_resolve(&name)
            .map(|text| text.to_string())
    }

    /// The interned empty string, used as the name of anonymous symbols.
    #[must_use]
    pub fn empty_name(&self) -> Name {
        self.empty
    }

    /// Whether `name` is the anonymous (empty) name.
    #[must_use]
    pub fn is_anonymous(&self, name: Name) -> bool {
        name == self.empty
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let interner = Interner::new();
        let a = interner.intern("module");
        let b = interner.intern("module");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "module");
    }

    #[test]
    fn empty_name_is_anonymous() {
        let interner = Interner::new();
        assert!(interner.is_anonymous(interner.empty_name()));
        assert_eq!(interner.intern(""), interner.empty_name());
        assert!(!interner.is_anonymous(interner.intern("x")));
    }
}
