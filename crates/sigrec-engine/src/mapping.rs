//! Static lookup tables: read-only/mutable collection pairs and host platform analogs.
//!
//! Both are plain data built once and handed to the engine by reference.

use std::collections::HashMap;

use sigrec_types::{names, BaseType, ClassId, TypeEnv};

/// Read-only collection interfaces paired with their mutable counterparts.
const COLLECTION_PAIRS: &[(&str, &str)] = &[
    (names::ITERABLE, names::MUTABLE_ITERABLE),
    (names::ITERATOR, names::MUTABLE_ITERATOR),
    (names::LIST_ITERATOR, names::MUTABLE_LIST_ITERATOR),
    (names::COLLECTION, names::MUTABLE_COLLECTION),
    (names::LIST, names::MUTABLE_LIST),
    (names::SET, names::MUTABLE_SET),
    (names::MAP, names::MUTABLE_MAP),
    (names::MAP_ENTRY, names::MUTABLE_MAP_ENTRY),
];

/// Bidirectional map between mutable and read-only collection classifiers.
#[derive(Clone, Debug, Default)]
pub struct CollectionMutability {
    mutable_to_read_only: HashMap<ClassId, ClassId>,
    read_only_to_mutable: HashMap<ClassId, ClassId>,
}

impl CollectionMutability {
    /// Resolves the builtin collection pairs in `env`; pairs missing from `env` are skipped.
    pub fn from_env(env: &dyn TypeEnv) -> Self {
        let mut table = Self::default();
        for (read_only, mutable) in COLLECTION_PAIRS {
            if let (Some(read_only), Some(mutable)) =
                (env.lookup_class(read_only), env.lookup_class(mutable))
            {
                table.insert(read_only, mutable);
            }
        }
        table
    }

    pub fn insert(&mut self, read_only: ClassId, mutable: ClassId) {
        self.read_only_to_mutable.insert(read_only, mutable);
        self.mutable_to_read_only.insert(mutable, read_only);
    }

    pub fn is_mutable(&self, class: ClassId) -> bool {
        self.mutable_to_read_only.contains_key(&class)
    }

    pub fn is_read_only(&self, class: ClassId) -> bool {
        self.read_only_to_mutable.contains_key(&class)
    }

    pub fn to_mutable(&self, read_only: ClassId) -> Option<ClassId> {
        self.read_only_to_mutable.get(&read_only).copied()
    }

    pub fn to_read_only(&self, mutable: ClassId) -> Option<ClassId> {
        self.mutable_to_read_only.get(&mutable).copied()
    }
}

/// Host (`java.*`) classes and the classifiers that stand for them.
///
/// A host class may have several analogs: `java.util.List` is both `List` and `MutableList`.
/// Host names are binary names (`java.util.Map$Entry`).
#[derive(Clone, Debug, Default)]
pub struct PlatformAnalogs {
    by_host: HashMap<String, Vec<String>>,
    host_by_name: HashMap<String, String>,
    primitives: HashMap<String, BaseType>,
}

impl PlatformAnalogs {
    pub fn builtin() -> Self {
        let mut analogs = Self::default();

        analogs.insert("java.lang.Object", names::ANY);
        analogs.insert("java.lang.String", names::STRING);
        analogs.insert("java.lang.CharSequence", names::CHAR_SEQUENCE);
        analogs.insert("java.lang.Number", names::NUMBER);
        analogs.insert("java.lang.Comparable", names::COMPARABLE);
        analogs.insert("java.lang.Void", names::NOTHING);

        for (host, name, base) in [
            ("java.lang.Boolean", names::BOOLEAN, BaseType::Boolean),
            ("java.lang.Byte", names::BYTE, BaseType::Byte),
            ("java.lang.Character", names::CHAR, BaseType::Char),
            ("java.lang.Short", names::SHORT, BaseType::Short),
            ("java.lang.Integer", names::INT, BaseType::Int),
            ("java.lang.Long", names::LONG, BaseType::Long),
            ("java.lang.Float", names::FLOAT, BaseType::Float),
            ("java.lang.Double", names::DOUBLE, BaseType::Double),
        ] {
            analogs.insert(host, name);
            analogs.primitives.insert(name.to_owned(), base);
        }

        for (host, (read_only, mutable)) in [
            "java.lang.Iterable",
            "java.util.Iterator",
            "java.util.ListIterator",
            "java.util.Collection",
            "java.util.List",
            "java.util.Set",
            "java.util.Map",
            "java.util.Map$Entry",
        ]
        .into_iter()
        .zip(COLLECTION_PAIRS)
        {
            analogs.insert(host, read_only);
            analogs.insert(host, mutable);
        }

        analogs
    }

    /// Registers `name` as an analog of the host class `host`.
    pub fn insert(&mut self, host: &str, name: &str) {
        let analogs = self.by_host.entry(host.to_owned()).or_default();
        if !analogs.iter().any(|existing| existing == name) {
            analogs.push(name.to_owned());
        }
        self.host_by_name
            .entry(name.to_owned())
            .or_insert_with(|| host.to_owned());
    }

    pub fn host_name(&self, name: &str) -> Option<&str> {
        self.host_by_name.get(name).map(String::as_str)
    }

    pub fn names_for_host(&self, host: &str) -> &[String] {
        self.by_host.get(host).map(Vec::as_slice).unwrap_or_default()
    }

    /// Other classifiers standing for the same host class as `name`.
    pub fn analogs_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.host_name(name)
            .map(|host| self.names_for_host(host))
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .filter(move |candidate| *candidate != name)
    }

    /// The host primitive a non-null `name` erases to, e.g. `kotlin.Int` to `int`.
    pub fn primitive(&self, name: &str) -> Option<BaseType> {
        self.primitives.get(name).copied()
    }
}
