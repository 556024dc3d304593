//! Bundle types and their instances.
//!
//! A [`Bundle`] is a named structural type grouping signals and nested
//! bundles. Each signal member carries an explicit direction, a
//! (source-role, destination-role) pair, or nothing. Bundle types are shared
//! behind [`Arc`] and live for as long as anything refers to them.

use crate::direction::Direction;
use crate::error::IrError;
use crate::ids::SignalId;
use crate::instance::Connection;
use indexmap::IndexMap;
use std::sync::Arc;
use weft_common::Ident;

/// How a bundle signal member gets its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDir {
    /// No direction; allowed only on bundles never exposed as ports.
    None,
    /// A fixed direction, toggled by flipping.
    Explicit(Direction),
    /// Output for the `src` role, input for the `dest` role, undirected for others.
    Roles {
        /// Role that drives the signal.
        src: String,
        /// Role that receives the signal.
        dest: String,
    },
}

/// One member of a [`Bundle`].
#[derive(Debug, Clone, PartialEq)]
pub enum BundleMember {
    /// A primitive signal.
    Signal {
        /// Bit width.
        width: u32,
        /// Direction rule.
        dir: MemberDir,
    },
    /// A nested bundle.
    Bundle {
        /// The nested type.
        of: Arc<Bundle>,
        /// Role the nested bundle plays; inherited by name when `None`.
        role: Option<String>,
        /// Whether explicit directions inside are toggled.
        flipped: bool,
    },
}

/// A named structural connection type.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    name: String,
    roles: Vec<String>,
    members: IndexMap<String, BundleMember>,
}

impl Bundle {
    /// Starts declaring a bundle called `name`.
    pub fn builder(name: impl Into<String>) -> BundleBuilder {
        BundleBuilder {
            name: name.into(),
            roles: Vec::new(),
            members: Vec::new(),
        }
    }

    /// The bundle name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared roles, in order.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns `true` if `role` is one of this bundle's roles.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Members in declaration order.
    pub fn members(&self) -> &IndexMap<String, BundleMember> {
        &self.members
    }
}

/// Incremental declaration of a [`Bundle`].
#[derive(Debug)]
pub struct BundleBuilder {
    name: String,
    roles: Vec<String>,
    members: Vec<(String, BundleMember)>,
}

impl BundleBuilder {
    /// Declares the role set.
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Adds a signal member with an arbitrary direction rule.
    pub fn signal(mut self, name: &str, width: u32, dir: MemberDir) -> Self {
        self.members
            .push((name.to_string(), BundleMember::Signal { width, dir }));
        self
    }

    /// Adds an input signal.
    pub fn input(self, name: &str, width: u32) -> Self {
        self.signal(name, width, MemberDir::Explicit(Direction::Input))
    }

    /// Adds an output signal.
    pub fn output(self, name: &str, width: u32) -> Self {
        self.signal(name, width, MemberDir::Explicit(Direction::Output))
    }

    /// Adds a bidirectional signal.
    pub fn inout(self, name: &str, width: u32) -> Self {
        self.signal(name, width, MemberDir::Explicit(Direction::Inout))
    }

    /// Adds a signal driven by role `src` and received by role `dest`.
    pub fn role_signal(self, name: &str, width: u32, src: &str, dest: &str) -> Self {
        self.signal(
            name,
            width,
            MemberDir::Roles {
                src: src.to_string(),
                dest: dest.to_string(),
            },
        )
    }

    /// Adds a nested bundle that inherits roles by name.
    pub fn bundle(self, name: &str, of: &Arc<Bundle>) -> Self {
        self.bundle_with(name, of, None, false)
    }

    /// Adds a nested bundle with an explicit role and flip setting.
    pub fn bundle_with(
        mut self,
        name: &str,
        of: &Arc<Bundle>,
        role: Option<&str>,
        flipped: bool,
    ) -> Self {
        self.members.push((
            name.to_string(),
            BundleMember::Bundle {
                of: Arc::clone(of),
                role: role.map(str::to_string),
                flipped,
            },
        ));
        self
    }

    /// Validates and produces the shared bundle type.
    pub fn build(self) -> Result<Arc<Bundle>, IrError> {
        let mut members = IndexMap::with_capacity(self.members.len());
        for (name, member) in self.members {
            match &member {
                BundleMember::Signal { width: 0, .. } => {
                    return Err(IrError::ZeroWidth {
                        owner: self.name,
                        name,
                    });
                }
                BundleMember::Signal {
                    dir: MemberDir::Roles { src, dest },
                    ..
                } => {
                    for role in [src, dest] {
                        if !self.roles.contains(role) {
                            return Err(IrError::UnknownRole {
                                bundle: self.name,
                                role: role.clone(),
                            });
                        }
                    }
                }
                BundleMember::Bundle {
                    of,
                    role: Some(role),
                    ..
                } if !of.has_role(role) => {
                    return Err(IrError::UnknownRole {
                        bundle: of.name.clone(),
                        role: role.clone(),
                    });
                }
                _ => {}
            }
            if members.contains_key(&name) {
                return Err(IrError::DuplicateMember {
                    owner: self.name,
                    member: name,
                });
            }
            members.insert(name, member);
        }
        Ok(Arc::new(Bundle {
            name: self.name,
            roles: self.roles,
            members,
        }))
    }
}

/// What a [`BundleInstance`] instantiates.
#[derive(Debug, Clone, PartialEq)]
pub enum BundleKind {
    /// An instance of a declared bundle type.
    Typed {
        /// The bundle type.
        of: Arc<Bundle>,
        /// Role occupied when exposed as a port.
        role: Option<String>,
    },
    /// An ad hoc grouping of existing signals and bundles.
    Anon(IndexMap<Ident, Connection>),
}

/// A bundle placed inside a module.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleInstance {
    /// Instance name, unique in the module namespace.
    pub name: Ident,
    /// Typed or anonymous.
    pub kind: BundleKind,
    /// Whether this bundle is part of the module boundary.
    pub port: bool,
    /// Whether explicit directions are toggled.
    pub flipped: bool,
    /// Flattened members: relative path (such as `inner.p`) to module signal.
    pub members: IndexMap<String, SignalId>,
}
