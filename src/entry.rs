//! Key/value record shared by both table variants.

#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: String,
    pub(crate) value: V,
}

impl<V> Entry<V> {
    pub(crate) fn new(key: String, value: V) -> Self {
        Self { key, value }
    }

    pub(crate) fn as_pair(&self) -> (&str, &V) {
        (self.key.as_str(), &self.value)
    }
}
