use std::fmt;

/// A dotted alias hierarchy, e.g. `employee.supervisor.person`.
///
/// Each segment is a join alias step: the root entity alias followed by one
/// relation name per hop.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    pub fn root(alias: impl Into<String>) -> Self {
        Namespace {
            segments: vec![alias.into()],
        }
    }

    /// Parses `a.b.c`. The empty string is the empty namespace.
    pub fn parse(src: &str) -> Self {
        Namespace {
            segments: src
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// One hop deeper: `employee` + `person` = `employee.person`.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Namespace { segments }
    }

    pub fn parent(&self) -> Option<Namespace> {
        match self.segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Namespace {
                segments: rest.to_vec(),
            }),
            _ => None,
        }
    }

    /// Structural containment over segments: `employee.supervisor.person`
    /// starts with `employee` and with `employee.supervisor`, but not with
    /// `employee.super`.
    pub fn starts_with(&self, prefix: &Namespace) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Every non-empty prefix of this namespace, shortest first.
    pub fn prefixes(&self) -> impl Iterator<Item = Namespace> + '_ {
        (1..=self.segments.len()).map(|len| Namespace {
            segments: self.segments[..len].to_vec(),
        })
    }

    /// The alias text used for this namespace in SQL.
    pub fn alias(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alias())
    }
}

impl From<&str> for Namespace {
    fn from(src: &str) -> Self {
        Namespace::parse(src)
    }
}

impl From<&Namespace> for Namespace {
    fn from(src: &Namespace) -> Self {
        src.clone()
    }
}

/// A field reference, optionally qualified by a namespace.
///
/// `employee.person/name` has namespace `employee.person` and name `name`.
/// Without a `/`, a dotted name splits on its last `.`, so `users.id` is the
/// `id` column of the `users` alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    namespace: Namespace,
    name: String,
}

impl Path {
    pub fn new(namespace: impl Into<Namespace>, name: impl Into<String>) -> Self {
        Path {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        Path {
            namespace: Namespace::default(),
            name: name.into(),
        }
    }

    pub fn parse(src: &str) -> Self {
        if let Some((namespace, name)) = src.rsplit_once('/') {
            return Path::new(Namespace::parse(namespace), name);
        }

        match src.rsplit_once('.') {
            Some((namespace, name)) => Path::new(Namespace::parse(namespace), name),
            None => Path::unqualified(src),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }

    /// Returns `self` qualified with `namespace` if it is not qualified yet.
    pub fn ensure_prefixed(&self, namespace: &Namespace) -> Path {
        if self.is_qualified() {
            self.clone()
        } else {
            Path::new(namespace.clone(), self.name.clone())
        }
    }

    /// True when this field lives in `namespace` or one of its descendants.
    pub fn is_prefixed(&self, namespace: &Namespace) -> bool {
        self.namespace.starts_with(namespace)
    }

    /// Drops the namespace when it is exactly `namespace`.
    pub fn strip_namespace(&self, namespace: &Namespace) -> Path {
        if &self.namespace == namespace {
            Path::unqualified(self.name.clone())
        } else {
            self.clone()
        }
    }

    /// Re-roots a path from `from` to `to`, keeping deeper segments.
    pub fn rebase(&self, from: &Namespace, to: &Namespace) -> Path {
        if !self.namespace.starts_with(from) {
            return self.clone();
        }

        let mut segments = to.segments().to_vec();
        segments.extend_from_slice(&self.namespace.segments()[from.len()..]);

        Path {
            namespace: Namespace { segments },
            name: self.name.clone(),
        }
    }

    /// Column label relative to `root`: `employee.person/name` relative to
    /// `employee` is `person/name`, and `employee/id` is `id`.
    pub fn label_relative_to(&self, root: &Namespace) -> String {
        if !self.namespace.starts_with(root) {
            return self.to_string();
        }

        let rest = &self.namespace.segments()[root.len()..];

        if rest.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", rest.join("."), self.name)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

impl From<&str> for Path {
    fn from(src: &str) -> Self {
        Path::parse(src)
    }
}

impl From<String> for Path {
    fn from(src: String) -> Self {
        Path::parse(&src)
    }
}

impl From<&Path> for Path {
    fn from(src: &Path) -> Self {
        src.clone()
    }
}
