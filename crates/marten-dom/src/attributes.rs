//! Element attribute lists.
//!
//! [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
//!
//! "Attr nodes are simply known as attributes... Attributes have a
//! namespace (null or a non-empty string), namespace prefix, local name,
//! value, and element."

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace URI, or `None` for ordinary (null-namespace) attributes.
    pub namespace: Option<String>,
    /// "An attribute's local name"
    pub name: String,
    /// "An attribute's value"
    pub value: String,
}

/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#concept-element-attribute)
///
/// "An element has an associated attribute list... Unless explicitly given
/// when an element is created, its attribute list is empty."
///
/// Attributes keep their insertion order. Lookups without a namespace only
/// consider null-namespace attributes, mirroring `getAttribute` on HTML
/// elements; namespaced lookups go through [`Attributes::get_ns`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    list: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Value of the null-namespace attribute `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_ns(None, name)
    }

    /// [§ 4.9 get an attribute by namespace and local name](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-namespace)
    ///
    /// Value of the attribute with the given namespace and local name.
    #[must_use]
    pub fn get_ns(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Value of the first attribute called `name` in any namespace.
    #[must_use]
    pub fn get_any_ns(&self, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether a null-namespace attribute `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a null-namespace attribute, replacing any previous value.
    pub fn set(&mut self, name: &str, value: &str) {
        self.set_ns(None, name, value);
    }

    /// [§ 4.9 set an attribute value](https://dom.spec.whatwg.org/#concept-element-attributes-set-value)
    ///
    /// "If attribute is null, create an attribute... and then append this
    /// attribute to element. ... Change attribute to value."
    pub fn set_ns(&mut self, namespace: Option<&str>, name: &str, value: &str) {
        if let Some(existing) = self
            .list
            .iter_mut()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.name == name)
        {
            value.clone_into(&mut existing.value);
            return;
        }
        self.list.push(Attribute {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Remove a null-namespace attribute, returning its old value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .list
            .iter()
            .position(|attr| attr.namespace.is_none() && attr.name == name)?;
        Some(self.list.remove(index).value)
    }

    /// Iterate over all attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.list.iter()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}
