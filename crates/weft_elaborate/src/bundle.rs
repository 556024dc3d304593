//! The bundle resolver.
//!
//! Typed bundle instances are flattened as soon as they are declared: every
//! primitive member becomes a signal of the enclosing module named by its
//! path, such as `bus.inner.p`. For bundle ports each member also gets a
//! direction, from its explicit direction or from the occupied role:
//! the source role drives (output), the destination role receives (input),
//! any other role is undirected. Flipping toggles input and output after
//! role resolution. Nested bundles without an explicit role inherit the
//! enclosing role when their own role set contains one of that name.

use crate::context::Context;
use crate::errors::ElabError;
use crate::handles::{BundleRef, Connectable, SignalRef};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;
use weft_ir::{
    Bundle, BundleInstance, BundleKind, BundleMember, Direction, MemberDir, ModuleId, PortEntry,
    Signal, SignalKind,
};

/// One primitive member of a flattened bundle type.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatMember {
    path: Vec<String>,
    width: u32,
    direction: Option<Direction>,
    role_based: bool,
}

/// Recursively expands `of` into primitive members.
fn flatten(of: &Bundle, role: Option<&str>, prefix: &[String], out: &mut Vec<FlatMember>) {
    for (name, member) in of.members() {
        let mut path = prefix.to_vec();
        path.push(name.clone());
        match member {
            BundleMember::Signal { width, dir } => {
                let (direction, role_based) = match dir {
                    MemberDir::None => (None, false),
                    MemberDir::Explicit(d) => (Some(*d), false),
                    MemberDir::Roles { src, dest } => {
                        let resolved = role.map(|r| {
                            if r == src {
                                Direction::Output
                            } else if r == dest {
                                Direction::Input
                            } else {
                                Direction::Undirected
                            }
                        });
                        (resolved, true)
                    }
                };
                out.push(FlatMember {
                    path,
                    width: *width,
                    direction,
                    role_based,
                });
            }
            BundleMember::Bundle {
                of: inner,
                role: inner_role,
                flipped,
            } => {
                let inherited = role.filter(|r| inner.has_role(r));
                let start = out.len();
                flatten(inner, inner_role.as_deref().or(inherited), &path, out);
                if *flipped {
                    for m in &mut out[start..] {
                        m.direction = m.direction.map(Direction::flip);
                    }
                }
            }
        }
    }
}

impl Context {
    /// Declares an internal instance of bundle type `of`.
    pub fn bundle(&mut self, module: ModuleId, name: &str, of: &Arc<Bundle>) -> Result<BundleRef, ElabError> {
        self.add_typed_bundle(module, name, of, None, false)
    }

    /// Declares a bundle port occupying `role`.
    ///
    /// Role-based bundles require a role from their role set; explicit
    /// bundles must not be given one, and every member must carry a direction.
    pub fn bundle_port(
        &mut self,
        module: ModuleId,
        name: &str,
        of: &Arc<Bundle>,
        role: Option<&str>,
    ) -> Result<BundleRef, ElabError> {
        self.add_typed_bundle(module, name, of, role, true)
    }

    /// Declares a bundle port like [`Context::bundle_port`], with every
    /// explicit direction flipped.
    pub fn flipped_bundle_port(
        &mut self,
        module: ModuleId,
        name: &str,
        of: &Arc<Bundle>,
        role: Option<&str>,
    ) -> Result<BundleRef, ElabError> {
        let bundle = self.add_typed_bundle(module, name, of, role, true)?;
        self.flip(bundle)?;
        Ok(bundle)
    }

    fn add_typed_bundle(
        &mut self,
        module: ModuleId,
        name: &str,
        of: &Arc<Bundle>,
        role: Option<&str>,
        port: bool,
    ) -> Result<BundleRef, ElabError> {
        self.ensure_open(module)?;
        let path = self.path(module, name);
        let role_error = |reason: String| ElabError::BundleRole {
            path: path.clone(),
            bundle: of.name().to_string(),
            reason,
        };
        match role {
            Some(r) if !of.has_role(r) => {
                return Err(role_error(format!("'{r}' is not one of its roles")));
            }
            None if port && !of.roles().is_empty() => {
                return Err(role_error("exposed as a port without a role".to_string()));
            }
            _ => {}
        }

        let mut members = Vec::new();
        flatten(of, role, &[], &mut members);
        if port {
            if let Some(m) = members.iter().find(|m| m.direction.is_none()) {
                let member = m.path.join(".");
                return Err(if m.role_based {
                    role_error(format!("member '{member}' has no role to resolve against"))
                } else {
                    ElabError::BundleDirection {
                        path: path.clone(),
                        signal: member,
                    }
                });
            }
        }

        let sep = self.options().bundle_separator.clone();
        let base = self.claim_name(module, name)?;
        let mut names = Vec::with_capacity(members.len());
        for m in &members {
            let full = format!("{name}{sep}{}", m.path.join(&sep));
            names.push(self.claim_name(module, &full)?);
        }

        let m = self.design.module_mut(module);
        let id = m.push_bundle(BundleInstance {
            name: base,
            kind: BundleKind::Typed {
                of: Arc::clone(of),
                role: role.map(str::to_string),
            },
            port,
            flipped: false,
            members: IndexMap::new(),
        });
        let mut flat = IndexMap::with_capacity(members.len());
        for (member, ident) in members.into_iter().zip(names) {
            let kind = if port {
                SignalKind::Port(member.direction.unwrap_or(Direction::Undirected))
            } else {
                SignalKind::Internal
            };
            let sid = m.push_signal(Signal {
                name: ident,
                width: member.width,
                kind,
                bundle: Some(id),
            });
            flat.insert(member.path.join(&sep), sid);
        }
        m.bundles[id].members = flat;
        if port {
            m.ports.push(PortEntry::Bundle(id));
        }
        trace!(bundle = %path, of = of.name(), port, "bundle flattened");
        Ok(BundleRef { module, id })
    }

    /// Toggles input and output on every member of a bundle port.
    ///
    /// Inout and undirected members are unchanged; flipping twice restores
    /// the original directions.
    pub fn flip(&mut self, bundle: BundleRef) -> Result<(), ElabError> {
        self.ensure_open(bundle.module)?;
        let m = self.design.module_mut(bundle.module);
        let inst = &mut m.bundles[bundle.id];
        inst.flipped = !inst.flipped;
        let signals: Vec<_> = inst.members.values().copied().collect();
        if matches!(inst.kind, BundleKind::Typed { .. }) {
            for sid in signals {
                let sig = &mut m.signals[sid];
                if let SignalKind::Port(d) = sig.kind {
                    sig.kind = SignalKind::Port(d.flip());
                }
            }
        }
        Ok(())
    }

    /// Groups existing signals and bundles into an anonymous bundle.
    ///
    /// The result connects to bundle ports exactly like a typed instance
    /// whose members carry the given names.
    pub fn bundlize<'a, I>(&mut self, module: ModuleId, name: &str, members: I) -> Result<BundleRef, ElabError>
    where
        I: IntoIterator<Item = (&'a str, Connectable)>,
    {
        self.ensure_open(module)?;
        let sep = self.options().bundle_separator.clone();
        let mut parts = IndexMap::new();
        let mut flat = IndexMap::new();
        for (member, to) in members {
            if to.module() != module {
                return Err(ElabError::ForeignHandle {
                    path: self.path(module, name),
                    owner: self.design.module_name(to.module()).to_string(),
                });
            }
            let ident = self.design.intern(member);
            if parts.insert(ident, to.local()).is_some() {
                return Err(ElabError::DuplicateName {
                    path: self.path(module, name),
                    name: member.to_string(),
                });
            }
            match to {
                Connectable::Signal(s) => {
                    flat.insert(member.to_string(), s.id);
                }
                Connectable::Bundle(b) => {
                    for (path, sid) in &self.design.module(module).bundles[b.id].members {
                        flat.insert(format!("{member}{sep}{path}"), *sid);
                    }
                }
            }
        }
        let base = self.claim_name(module, name)?;
        let id = self.design.module_mut(module).push_bundle(BundleInstance {
            name: base,
            kind: BundleKind::Anon(parts),
            port: false,
            flipped: false,
            members: flat,
        });
        Ok(BundleRef { module, id })
    }

    /// Returns the signal flattened from member `path` (such as `inner.p`).
    pub fn bundle_member(&self, bundle: BundleRef, path: &str) -> Result<SignalRef, ElabError> {
        let m = self.design.module(bundle.module);
        let inst = &m.bundles[bundle.id];
        inst.members
            .get(path)
            .map(|id| SignalRef {
                module: bundle.module,
                id: *id,
            })
            .ok_or_else(|| ElabError::UnresolvedReference {
                path: self.path(bundle.module, self.design.resolve(inst.name)),
                name: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff() -> Arc<Bundle> {
        Bundle::builder("Diff").inout("p", 1).inout("n", 1).build().unwrap()
    }

    fn bus() -> Arc<Bundle> {
        Bundle::builder("Bus")
            .output("data", 8)
            .input("ready", 1)
            .bundle("clk", &diff())
            .build()
            .unwrap()
    }

    fn spi() -> Arc<Bundle> {
        Bundle::builder("Spi")
            .roles(["HOST", "DEVICE"])
            .role_signal("sck", 1, "HOST", "DEVICE")
            .role_signal("miso", 1, "DEVICE", "HOST")
            .build()
            .unwrap()
    }

    fn directions(ctx: &Context, b: BundleRef) -> Vec<(String, Direction)> {
        let m = ctx.design.module(b.module);
        m.bundles[b.id]
            .members
            .iter()
            .map(|(path, sid)| {
                (
                    path.clone(),
                    m.signals[*sid].direction().unwrap_or(Direction::Undirected),
                )
            })
            .collect()
    }

    #[test]
    fn nested_bundle_flattens_with_paths() {
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let b = ctx.bundle_port(m, "bus", &bus(), None).unwrap();
        let names: Vec<_> = ctx
            .design
            .module(m)
            .signals
            .values()
            .map(|s| ctx.design.resolve(s.name).to_string())
            .collect();
        assert_eq!(names, ["bus.data", "bus.ready", "bus.clk.p", "bus.clk.n"]);
        assert_eq!(ctx.bundle_member(b, "clk.p").unwrap().id, ctx.design.module(m).bundles[b.id].members["clk.p"]);
        assert!(ctx.bundle_member(b, "clk.q").is_err());
    }

    #[test]
    fn custom_separator() {
        let mut opts = weft_config::ElabOptions::default();
        opts.bundle_separator = "_".into();
        let mut ctx = Context::with_options(opts);
        let m = ctx.module("M");
        ctx.bundle(m, "bus", &bus()).unwrap();
        assert!(ctx.lookup(m, "bus_clk_p").is_ok());
    }

    #[test]
    fn flipped_port_matches_flip_after_declaration() {
        let mut ctx = Context::new();
        let a = ctx.module("A");
        let declared = ctx.flipped_bundle_port(a, "bus", &bus(), None).unwrap();
        let b = ctx.module("B");
        let later = ctx.bundle_port(b, "bus", &bus(), None).unwrap();
        ctx.flip(later).unwrap();
        assert_eq!(directions(&ctx, declared), directions(&ctx, later));
        assert!(ctx.design.module(a).bundles[declared.id].flipped);
    }

    #[test]
    fn flip_toggles_and_is_idempotent_twice() {
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let b = ctx.bundle_port(m, "bus", &bus(), None).unwrap();
        let original = directions(&ctx, b);
        ctx.flip(b).unwrap();
        let flipped = directions(&ctx, b);
        assert_eq!(flipped[0], ("data".to_string(), Direction::Input));
        assert_eq!(flipped[1], ("ready".to_string(), Direction::Output));
        assert_eq!(flipped[2], ("clk.p".to_string(), Direction::Inout));
        ctx.flip(b).unwrap();
        assert_eq!(directions(&ctx, b), original);
    }

    #[test]
    fn roles_resolve_directions() {
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let host = ctx.bundle_port(m, "host", &spi(), Some("HOST")).unwrap();
        let dev = ctx.bundle_port(m, "dev", &spi(), Some("DEVICE")).unwrap();
        assert_eq!(
            directions(&ctx, host),
            [("sck".to_string(), Direction::Output), ("miso".to_string(), Direction::Input)]
        );
        assert_eq!(
            directions(&ctx, dev),
            [("sck".to_string(), Direction::Input), ("miso".to_string(), Direction::Output)]
        );
    }

    #[test]
    fn third_role_is_undirected() {
        let tri = Bundle::builder("Tri")
            .roles(["A", "B", "MONITOR"])
            .role_signal("x", 1, "A", "B")
            .build()
            .unwrap();
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let b = ctx.bundle_port(m, "t", &tri, Some("MONITOR")).unwrap();
        assert_eq!(directions(&ctx, b), [("x".to_string(), Direction::Undirected)]);
    }

    #[test]
    fn role_bundle_port_requires_role() {
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let err = ctx.bundle_port(m, "s", &spi(), None).unwrap_err();
        assert_eq!(err.code(), "E306");
        let err = ctx.bundle_port(m, "s", &spi(), Some("ROUTER")).unwrap_err();
        assert_eq!(err.code(), "E306");
        // Internal role-based bundles need no role.
        assert!(ctx.bundle(m, "s", &spi()).is_ok());
    }

    #[test]
    fn undirected_member_on_port_fails() {
        let loose = Bundle::builder("Loose")
            .signal("x", 1, MemberDir::None)
            .build()
            .unwrap();
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let err = ctx.bundle_port(m, "l", &loose, None).unwrap_err();
        assert_eq!(
            err,
            ElabError::BundleDirection {
                path: "M.l".into(),
                signal: "x".into()
            }
        );
        assert!(ctx.bundle(m, "l", &loose).is_ok());
    }

    #[test]
    fn nested_role_bundle_inherits_role_by_name() {
        let outer = Bundle::builder("Outer")
            .roles(["HOST", "DEVICE"])
            .bundle("spi", &spi())
            .role_signal("irq", 1, "DEVICE", "HOST")
            .build()
            .unwrap();
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let b = ctx.bundle_port(m, "o", &outer, Some("HOST")).unwrap();
        assert_eq!(
            directions(&ctx, b),
            [
                ("spi.sck".to_string(), Direction::Output),
                ("spi.miso".to_string(), Direction::Input),
                ("irq".to_string(), Direction::Input),
            ]
        );
    }

    #[test]
    fn nested_role_bundle_without_matching_role_fails() {
        let outer = Bundle::builder("Outer")
            .roles(["LEFT", "RIGHT"])
            .bundle("spi", &spi())
            .build()
            .unwrap();
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let err = ctx.bundle_port(m, "o", &outer, Some("LEFT")).unwrap_err();
        assert!(matches!(err, ElabError::BundleRole { .. }));
    }

    #[test]
    fn flipped_nested_member() {
        let outer = Bundle::builder("Pair")
            .bundle_with("tx", &bus(), None, false)
            .bundle_with("rx", &bus(), None, true)
            .build()
            .unwrap();
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let b = ctx.bundle_port(m, "p", &outer, None).unwrap();
        let dirs = directions(&ctx, b);
        assert_eq!(dirs[0], ("tx.data".to_string(), Direction::Output));
        assert_eq!(dirs[4], ("rx.data".to_string(), Direction::Input));
    }

    #[test]
    fn bundlize_groups_existing_signals() {
        let mut ctx = Context::new();
        let m = ctx.module("M");
        let p = ctx.signal(m, "pos", 1).unwrap();
        let n = ctx.signal(m, "neg", 1).unwrap();
        let clk = ctx.bundlize(m, "clk", [("p", p.into()), ("n", n.into())]).unwrap();
        let data = ctx.signal(m, "d", 8).unwrap();
        let outer = ctx
            .bundlize(m, "grp", [("data", data.into()), ("clk", clk.into())])
            .unwrap();
        let members: Vec<_> = ctx.design.module(m).bundles[outer.id]
            .members
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        assert_eq!(
            members,
            [
                ("data".to_string(), data.id),
                ("clk.p".to_string(), p.id),
                ("clk.n".to_string(), n.id),
            ]
        );
        let err = ctx.bundlize(m, "dup", [("a", p.into()), ("a", n.into())]).unwrap_err();
        assert!(matches!(err, ElabError::DuplicateName { .. }));
    }

    #[test]
    fn bundle_name_collisions_are_detected() {
        let mut ctx = Context::new();
        let m = ctx.module("M");
        ctx.signal(m, "bus.data", 8).unwrap();
        let err = ctx.bundle(m, "bus", &bus()).unwrap_err();
        assert!(matches!(err, ElabError::DuplicateName { name, .. } if name == "bus.data"));
        // Nothing was half-added.
        assert!(ctx.lookup(m, "bus").is_err());
    }
}
