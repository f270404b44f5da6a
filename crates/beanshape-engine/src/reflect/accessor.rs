//! Member accessors

use std::fmt;

use beanshape_sdk::{AccessResult, HostObject, HostValue, ReadFn, TypeKey, WriteFn};

/// Bound read/write capability pair for one attribute on one host type.
///
/// Built once during reflection and shared by `Arc` from the composite
/// attribute that exposes it.
#[derive(Clone)]
pub struct MemberAccessor {
    owner: TypeKey,
    owner_name: String,
    name: String,
    read: Option<ReadFn>,
    write: Option<WriteFn>,
}

impl MemberAccessor {
    /// Bind a member's capabilities.
    ///
    /// Returns `None` when neither capability is present.
    pub fn new(
        owner: TypeKey,
        owner_name: &str,
        name: &str,
        read: Option<ReadFn>,
        write: Option<WriteFn>,
    ) -> Option<Self> {
        if read.is_none() && write.is_none() {
            return None;
        }
        Some(Self {
            owner,
            owner_name: owner_name.to_string(),
            name: name.to_string(),
            read,
            write,
        })
    }

    /// Declaring host type
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// Declaring host type name
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Underlying member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the read capability is present
    pub fn is_readable(&self) -> bool {
        self.read.is_some()
    }

    /// Returns true if the write capability is present
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Read from `instance`; `None` if the accessor is write-only
    pub fn try_read(&self, instance: &dyn HostObject) -> Option<AccessResult<HostValue>> {
        self.read.as_ref().map(|read| read(instance))
    }

    /// Write to `instance`; `None` if the accessor is read-only
    pub fn try_write(&self, instance: &dyn HostObject, value: HostValue) -> Option<AccessResult<()>> {
        self.write.as_ref().map(|write| write(instance, value))
    }
}

impl fmt::Debug for MemberAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberAccessor")
            .field("owner", &self.owner_name)
            .field("name", &self.name)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Accessors compare by binding, not by closure identity
impl PartialEq for MemberAccessor {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.name == other.name
            && self.is_readable() == other.is_readable()
            && self.is_writable() == other.is_writable()
    }
}
