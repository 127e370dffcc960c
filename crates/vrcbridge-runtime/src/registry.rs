//! The parameter registry.
//!
//! Holds the built-in (base) set seeded from the catalog and the dynamic set
//! merged in for the current avatar. Lookups are linear scans; a registry
//! holds tens to low hundreds of entries.
//!
//! Invariants:
//! - names are unique across base and dynamic
//! - outside pose composites, an address resolves to exactly one parameter
//! - written values are never clamped to bounds

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use vrcbridge_core::catalog::builtin_parameters;
use vrcbridge_core::{Category, Parameter, ParameterView, RegistryError};

/// Serializable registry contents for a newly connected subscriber.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Base parameters in catalog order.
    pub base: Vec<ParameterView>,
    /// The active avatar's parameters, in merge order.
    pub dynamic: Vec<ParameterView>,
}

/// Parameter storage. Owned by the dispatch loop.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    base: Vec<Parameter>,
    dynamic: Vec<Parameter>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in catalog.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::with_base(builtin_parameters())
    }

    /// Registry seeded with `params`.
    pub fn with_base(params: Vec<Parameter>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.load_base(params)?;
        Ok(registry)
    }

    /// Replace the base set. Rejects duplicate names and address conflicts
    /// outside pose composites; the registry is unchanged on error.
    pub fn load_base(&mut self, params: Vec<Parameter>) -> Result<(), RegistryError> {
        validate(&params)?;
        self.base = params;
        Ok(())
    }

    /// Merge an avatar's parameters.
    ///
    /// Any parameter whose address is already claimed (by the base set, the
    /// current dynamic set, or an earlier entry of `incoming`) or whose name
    /// is taken is dropped. Returns the accepted subset in input order.
    pub fn merge_dynamic(&mut self, incoming: Vec<Parameter>) -> Vec<Parameter> {
        let mut addresses: HashSet<String> = self.iter().map(|p| p.address.clone()).collect();
        let mut names: HashSet<String> = self.iter().map(|p| p.name.clone()).collect();
        let mut accepted = Vec::new();

        for param in incoming {
            if addresses.contains(&param.address) {
                info!(name = %param.name, address = %param.address, "address already claimed, skipping");
                continue;
            }
            if names.contains(&param.name) {
                info!(name = %param.name, "name already registered, skipping");
                continue;
            }
            let _ = addresses.insert(param.address.clone());
            let _ = names.insert(param.name.clone());
            accepted.push(param);
        }

        self.dynamic.extend(accepted.iter().cloned());
        accepted
    }

    /// Remove the named dynamic parameters. Base parameters are never
    /// removed. Returns how many were removed.
    pub fn unmerge_dynamic(&mut self, names: &[String]) -> usize {
        let before = self.dynamic.len();
        self.dynamic.retain(|p| !names.contains(&p.name));
        before - self.dynamic.len()
    }

    /// Find a parameter by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Parameter> {
        self.iter().find(|p| p.name == name)
    }

    /// Mutable variant of [`Registry::lookup_by_name`].
    pub fn lookup_by_name_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.iter_mut().find(|p| p.name == name)
    }

    /// Every parameter in `category`, base first.
    pub fn list_by_category(&self, category: Category) -> Vec<&Parameter> {
        self.iter().filter(|p| p.category == category).collect()
    }

    /// The first parameter an event of `category` at `address` resolves to.
    ///
    /// Pose composite members are excluded; they are updated as a group.
    pub fn resolve_mut(&mut self, category: Category, address: &str) -> Option<&mut Parameter> {
        self.iter_mut().find(|p| {
            !p.is_pose_component() && p.address == address && category.routes_to(p.category)
        })
    }

    /// Pose composite members at `address`.
    pub fn pose_components_mut<'a>(
        &'a mut self,
        address: &'a str,
    ) -> impl Iterator<Item = &'a mut Parameter> + 'a {
        self.iter_mut()
            .filter(move |p| p.is_pose_component() && p.address == address)
    }

    /// Base and dynamic views for a new subscriber.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            base: self.base.iter().map(Parameter::view).collect(),
            dynamic: self.dynamic_views(),
        }
    }

    /// Views of the dynamic set only.
    pub fn dynamic_views(&self) -> Vec<ParameterView> {
        self.dynamic.iter().map(Parameter::view).collect()
    }

    /// All parameters, base first.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.base.iter().chain(self.dynamic.iter())
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.base.iter_mut().chain(self.dynamic.iter_mut())
    }

    /// Total parameter count.
    pub fn len(&self) -> usize {
        self.base.len() + self.dynamic.len()
    }

    /// Whether the registry holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of dynamic parameters.
    pub fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }
}

fn validate(params: &[Parameter]) -> Result<(), RegistryError> {
    let mut names = HashSet::new();
    for p in params {
        if !names.insert(p.name.as_str()) {
            return Err(RegistryError::DuplicateName {
                name: p.name.clone(),
            });
        }
    }
    for (i, a) in params.iter().enumerate() {
        for b in &params[i + 1..] {
            let shared_pose = a.is_pose_component() && b.is_pose_component();
            if a.address == b.address && !shared_pose {
                return Err(RegistryError::AddressConflict {
                    address: a.address.clone(),
                    first: a.name.clone(),
                    second: b.name.clone(),
                });
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
