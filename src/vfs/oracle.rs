/// Opaque content-type handle minted by a [`TypeOracle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandle(String);

impl TypeHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Resolves entry names to content types.
///
/// The host environment decides what a type handle means; entries resolve
/// theirs once, when the view is constructed.
pub trait TypeOracle: Send + Sync {
    /// Returns the type for a file entry with the given title bytes.
    fn type_of_file(&self, title: &[u8]) -> TypeHandle;

    /// Returns the type used for all directory entries.
    fn type_of_directory(&self) -> TypeHandle;
}

/// Fallback oracle that assigns generic types to everything.
pub struct PlainTypeOracle;

impl TypeOracle for PlainTypeOracle {
    fn type_of_file(&self, _title: &[u8]) -> TypeHandle {
        TypeHandle::new("application/octet-stream")
    }

    fn type_of_directory(&self) -> TypeHandle {
        TypeHandle::new("inode/directory")
    }
}
