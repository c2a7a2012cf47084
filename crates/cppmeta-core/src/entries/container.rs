//! Structural metadata for container-like type entries.

/// Shape of a container type entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// `QList<T>`, `std::list<T>`.
    List,
    /// `QVector<T>`, `std::vector<T>`.
    Vector,
    /// `QLinkedList<T>`.
    LinkedList,
    /// `QQueue<T>`.
    Queue,
    /// `QStack<T>`.
    Stack,
    /// `QSet<T>`, `std::set<T>`.
    Set,
    /// `QMap<K, V>`, `std::map<K, V>`.
    Map,
    /// `QMultiMap<K, V>`.
    MultiMap,
    /// `QHash<K, V>`, `std::unordered_map<K, V>`.
    Hash,
    /// `QMultiHash<K, V>`.
    MultiHash,
    /// `QPair<A, B>`, `std::pair<A, B>`.
    Pair,
    /// `std::initializer_list<T>`.
    InitializerList,
    /// `QStringList`: a list with a fixed element type.
    StringList,
    /// `QByteArrayList`: a list with a fixed element type.
    ByteArrayList,
}

impl ContainerKind {
    /// Number of template arguments this container takes.
    pub fn arity(self) -> usize {
        match self {
            ContainerKind::Map
            | ContainerKind::MultiMap
            | ContainerKind::Hash
            | ContainerKind::MultiHash
            | ContainerKind::Pair => 2,
            ContainerKind::StringList | ContainerKind::ByteArrayList => 0,
            _ => 1,
        }
    }

    /// Whether the container is keyed (maps and hashes).
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            ContainerKind::Map | ContainerKind::MultiMap | ContainerKind::Hash | ContainerKind::MultiHash
        )
    }

    /// Whether the container supports sequential iteration.
    pub fn is_sequential(self) -> bool {
        !self.is_associative() && self != ContainerKind::Pair
    }
}

/// Shape of a smart-pointer type entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerContainerKind {
    /// `QSharedPointer<T>`, `std::shared_ptr<T>`.
    SharedPointer,
    /// `QWeakPointer<T>`, `std::weak_ptr<T>`.
    WeakPointer,
    /// `QScopedPointer<T>`.
    ScopedPointer,
    /// `std::unique_ptr<T>`.
    UniquePointer,
    /// `QPointer<T>`.
    GuardedPointer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_arity() {
        assert_eq!(ContainerKind::List.arity(), 1);
        assert_eq!(ContainerKind::Map.arity(), 2);
        assert_eq!(ContainerKind::Pair.arity(), 2);
        assert_eq!(ContainerKind::StringList.arity(), 0);
    }

    #[test]
    fn container_iteration_shape() {
        assert!(ContainerKind::Hash.is_associative());
        assert!(!ContainerKind::Hash.is_sequential());
        assert!(ContainerKind::Vector.is_sequential());
        assert!(!ContainerKind::Pair.is_sequential());
    }
}
